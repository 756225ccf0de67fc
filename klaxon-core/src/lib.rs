//! Board-agnostic core logic for actuator sequencing
//!
//! This crate contains everything that does not depend on a specific
//! board:
//!
//! - Polarity handling (active-high / active-low devices)
//! - The [`Actuator`] sequencer with its safe-level guarantees
//! - Cooperative cancellation
//! - Error taxonomy
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod actuator;
pub mod cancel;
pub mod config;
pub mod error;
pub mod level;

pub use actuator::{Actuator, ActuatorState, DEFAULT_POLL_INTERVAL};
pub use cancel::{CancelFlag, Cancellation, NeverCancel};
pub use config::{ActuatorConfig, PatternConfig};
pub use error::{BindError, DriveError};
pub use level::ActiveLevel;
