//! Klaxon Hardware Abstraction Layer
//!
//! This crate defines the platform collaborator that the actuator core
//! consumes. A platform hands out exclusively-owned digital output lines;
//! the core never performs any platform-specific addressing itself.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (klaxon-cli, etc.)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  klaxon-core (actuator sequencing)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  klaxon-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ klaxon-hal-   │       │  hal::mock    │
//! │    rppal      │       │ (in-memory)   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::Platform`] - Opens output lines by address
//! - [`gpio::OutputLine`] - Writes levels, closes to the shutdown level

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

pub mod error;
pub mod gpio;
pub mod pins;

#[cfg(feature = "mock")]
pub mod mock;

// Re-export key types at crate root for convenience
pub use error::PlatformError;
pub use gpio::{Level, OutputLine, Platform};
pub use pins::{parse_pin_string, PinAllocator, PinConfig};
