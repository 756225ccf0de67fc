//! Raspberry Pi HAL for Klaxon
//!
//! This crate implements the `klaxon-hal` platform traits on top of `rppal`,
//! plus the blocking delay used on the board:
//!
//! - [`gpio::RppalPlatform`] - Opens BCM-numbered GPIOs as output lines
//! - [`Delay`] - `embedded_hal::delay::DelayNs` backed by thread sleep

#![deny(unsafe_code)]

pub mod gpio;

pub use gpio::{RppalLine, RppalPlatform};
pub use rppal::hal::Delay;

// Re-export shared traits from klaxon-hal for convenience
pub use klaxon_hal::{Level, OutputLine, Platform, PlatformError};
