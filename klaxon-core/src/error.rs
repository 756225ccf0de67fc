//! Actuator error types

use klaxon_hal::PlatformError;
use thiserror::Error;

/// Errors from binding an actuator to a platform address
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BindError {
    /// Address is already bound elsewhere
    #[error("gpio{0} is already bound")]
    AddressInUse(u8),
    /// Address does not exist on this platform
    #[error("gpio{0} is out of range for this platform")]
    AddressOutOfRange(u8),
    /// Platform collaborator failed or is unavailable
    #[error("platform error: {0}")]
    Platform(#[source] PlatformError),
}

impl From<PlatformError> for BindError {
    fn from(e: PlatformError) -> Self {
        match e {
            PlatformError::AddressInUse(a) => BindError::AddressInUse(a),
            PlatformError::InvalidAddress(a) => BindError::AddressOutOfRange(a),
            other => BindError::Platform(other),
        }
    }
}

/// Errors while driving a bound actuator
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveError {
    /// Writing the active level failed
    #[error("failed to energize actuator: {0}")]
    Energize(#[source] PlatformError),
    /// Writing the safe level failed
    #[error("failed to restore safe level: {0}")]
    Restore(#[source] PlatformError),
    /// Cancellation was requested; the line has been forced safe
    #[error("activation cancelled")]
    Cancelled,
    /// Actuator has already been released
    #[error("actuator has been released")]
    Released,
}

impl DriveError {
    /// Check if this error is a cancellation rather than a fault
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DriveError::Cancelled)
    }
}
