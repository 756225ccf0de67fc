//! GPIO allocation and pin configuration
//!
//! Tracks which GPIO pins are in use to prevent two lines owning the same
//! address, and parses the pin strings used in configuration files.

use heapless::FnvIndexSet;

use crate::error::{PlatformError, Result};

/// Number of user GPIOs on the Raspberry Pi 40-pin header (BCM 0-27)
pub const HEADER_GPIO_COUNT: u8 = 28;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    /// GPIO pin number (BCM numbering on the Raspberry Pi)
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
}

impl PinConfig {
    /// Create an active-high pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
        }
    }
}

/// GPIO allocator to track pin usage
pub struct PinAllocator {
    /// Number of addressable pins, `0..pin_count`
    pin_count: u8,
    /// Set of allocated GPIO pins
    allocated: FnvIndexSet<u8, 64>,
}

impl Default for PinAllocator {
    fn default() -> Self {
        Self::new(HEADER_GPIO_COUNT)
    }
}

impl PinAllocator {
    /// Create a new allocator for pins `0..pin_count`
    pub fn new(pin_count: u8) -> Self {
        Self {
            pin_count: pin_count.min(64),
            allocated: FnvIndexSet::new(),
        }
    }

    /// Allocate a GPIO pin
    ///
    /// # Errors
    ///
    /// `InvalidAddress` if the pin is out of range, `AddressInUse` if it is
    /// already allocated.
    pub fn allocate(&mut self, pin: u8) -> Result<()> {
        if pin >= self.pin_count {
            return Err(PlatformError::InvalidAddress(pin));
        }
        if self.allocated.contains(&pin) {
            return Err(PlatformError::AddressInUse(pin));
        }
        self.allocated
            .insert(pin)
            .map_err(|_| PlatformError::InvalidAddress(pin))?;
        Ok(())
    }

    /// Release a GPIO pin
    pub fn release(&mut self, pin: u8) {
        self.allocated.remove(&pin);
    }

    /// Check if a pin is allocated
    pub fn is_allocated(&self, pin: u8) -> bool {
        self.allocated.contains(&pin)
    }
}

/// Parse a pin string from config
///
/// Supports formats:
/// - "gpio5" -> pin 5, active-high
/// - "!gpio5" -> pin 5, inverted (active-low)
///
/// Range checking is left to the platform at bind time.
pub fn parse_pin_string(s: &str) -> Option<PinConfig> {
    let s = s.trim();

    let (s, inverted) = match s.strip_prefix('!') {
        Some(rest) => (rest, true),
        None => (s, false),
    };

    let num_str = s.strip_prefix("gpio")?;
    if num_str.is_empty() || !num_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let pin: u8 = num_str.parse().ok()?;

    Some(PinConfig { pin, inverted })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator() {
        let mut alloc = PinAllocator::default();

        assert!(alloc.allocate(5).is_ok());
        assert!(alloc.is_allocated(5));

        // Can't allocate same pin twice
        assert_eq!(alloc.allocate(5), Err(PlatformError::AddressInUse(5)));

        // Can allocate different pin
        assert!(alloc.allocate(6).is_ok());
        assert!(alloc.is_allocated(6));

        // Release and re-allocate
        alloc.release(5);
        assert!(!alloc.is_allocated(5));
        assert!(alloc.allocate(5).is_ok());
    }

    #[test]
    fn test_allocator_range() {
        let mut alloc = PinAllocator::new(28);
        assert!(alloc.allocate(27).is_ok());
        assert_eq!(alloc.allocate(28), Err(PlatformError::InvalidAddress(28)));
        assert_eq!(alloc.allocate(255), Err(PlatformError::InvalidAddress(255)));
    }

    #[test]
    fn test_parse_pin_string() {
        assert_eq!(parse_pin_string("gpio5"), Some(PinConfig::new(5)));
        assert_eq!(parse_pin_string("!gpio5"), Some(PinConfig::inverted(5)));
        assert_eq!(parse_pin_string(" gpio0 "), Some(PinConfig::new(0)));
        assert_eq!(parse_pin_string("gpio40"), Some(PinConfig::new(40)));

        // Invalid
        assert_eq!(parse_pin_string("gpio256"), None);
        assert_eq!(parse_pin_string("gpio+5"), None);
        assert_eq!(parse_pin_string("gpio"), None);
        assert_eq!(parse_pin_string("pin11"), None);
        assert_eq!(parse_pin_string("!"), None);
        assert_eq!(parse_pin_string(""), None);
    }
}
