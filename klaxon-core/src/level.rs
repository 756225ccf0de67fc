//! Actuator polarity

use klaxon_hal::Level;

/// Which physical level energizes the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    /// Device on when the line is HIGH
    #[default]
    ActiveHigh,
    /// Device on when the line is LOW (most buzzer and relay modules)
    ActiveLow,
}

impl ActiveLevel {
    /// Polarity from an "inverted" pin flag
    pub fn from_inverted(inverted: bool) -> Self {
        if inverted {
            ActiveLevel::ActiveLow
        } else {
            ActiveLevel::ActiveHigh
        }
    }

    /// Level that energizes the device
    pub fn active(self) -> Level {
        match self {
            ActiveLevel::ActiveHigh => Level::High,
            ActiveLevel::ActiveLow => Level::Low,
        }
    }

    /// Level that leaves the device de-energized
    pub fn safe(self) -> Level {
        !self.active()
    }
}
