//! Platform error types
//!
//! All platform implementations map their driver-specific errors to these
//! variants.

use thiserror::Error;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlatformError {
    /// The GPIO provider could not be initialized or reached
    #[error("GPIO platform unavailable")]
    Unavailable,
    /// Address is not a valid output on this platform
    #[error("gpio{0} is not available on this platform")]
    InvalidAddress(u8),
    /// Address is already owned by another line
    #[error("gpio{0} is already in use")]
    AddressInUse(u8),
    /// Writing a level to the line failed
    #[error("write to gpio{0} failed")]
    WriteFailed(u8),
    /// Line was used after it had been closed
    #[error("gpio{0} has been closed")]
    Closed(u8),
}

