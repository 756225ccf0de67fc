//! Digital output abstractions
//!
//! Provides the traits a platform implements to hand out digital output
//! lines. The shape follows the classic "open with an initial level and a
//! shutdown level" model: the platform guarantees the shutdown level is
//! applied whenever a line is closed.

use core::ops::Not;

use crate::error::Result;

/// Physical level of a digital line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    Low,
    /// Logic 1
    High,
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Digital output line
///
/// A line is exclusively owned by whoever opened it. Implementations must
/// release the underlying address when the line is closed or dropped.
pub trait OutputLine {
    /// Platform address of this line
    fn address(&self) -> u8;

    /// Drive the line to `level`
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::WriteFailed` if the hardware rejected the
    /// write, or `PlatformError::Closed` if the line has been closed.
    fn write(&mut self, level: Level) -> Result<()>;

    /// Last level successfully written to the line
    fn level(&self) -> Level;

    /// Apply the shutdown level and relinquish the address
    ///
    /// Calling this more than once is a no-op.
    fn close(&mut self);

    /// Check if the line has been closed
    fn is_closed(&self) -> bool;
}

/// Provider of digital output lines
///
/// Implementations should handle the actual pin configuration for the
/// specific board and track which addresses are in use.
pub trait Platform {
    /// Line type handed out by this platform
    type Line: OutputLine;

    /// Open `address` as a digital output
    ///
    /// The line is driven to `initial` as part of configuration, and to
    /// `shutdown` whenever it is closed.
    ///
    /// # Errors
    ///
    /// - `PlatformError::AddressInUse` if another line owns the address
    /// - `PlatformError::InvalidAddress` if the address is out of range
    /// - `PlatformError::Unavailable` if the provider cannot be reached
    fn open_output(&mut self, address: u8, initial: Level, shutdown: Level) -> Result<Self::Line>;
}
