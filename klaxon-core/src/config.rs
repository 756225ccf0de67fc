//! Configuration type definitions
//!
//! These types describe one actuator and the pattern it is driven
//! through. They are plain data; loading them from a file is up to the
//! application.

use core::time::Duration;

use heapless::String;

use crate::level::ActiveLevel;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum identifier length
pub const MAX_ID_LEN: usize = 16;

/// Maximum display name length
pub const MAX_NAME_LEN: usize = 32;

/// Build a fixed-capacity label, or `None` if `s` does not fit
pub fn label<const N: usize>(s: &str) -> Option<String<N>> {
    let mut out = String::new();
    out.push_str(s).ok()?;
    Some(out)
}

/// Actuator configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActuatorConfig {
    /// Short identifier (e.g., "buzzer")
    pub id: String<MAX_ID_LEN>,
    /// Human-readable name (e.g., "Active Buzzer")
    pub name: String<MAX_NAME_LEN>,
    /// Platform address (BCM GPIO number on the Raspberry Pi)
    pub address: u8,
    /// Which level energizes the device
    pub active_level: ActiveLevel,
    /// Cancellation check interval in ms (0 = only at span boundaries)
    pub poll_interval_ms: u32,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            id: label("buzzer").unwrap_or_default(),
            name: label("Active Buzzer").unwrap_or_default(),
            address: 5,
            active_level: ActiveLevel::ActiveLow,
            poll_interval_ms: 10,
        }
    }
}

impl ActuatorConfig {
    /// Polarity of the device
    pub fn polarity(&self) -> ActiveLevel {
        self.active_level
    }

    /// Cancellation check interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms as u64)
    }
}

/// Pulse pattern configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PatternConfig {
    /// Number of activations
    pub count: u32,
    /// Time energized per activation (ms)
    pub on_ms: u32,
    /// Time de-energized between activations (ms)
    pub off_ms: u32,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            count: 3,
            on_ms: 500,
            off_ms: 500,
        }
    }
}

impl PatternConfig {
    /// Time energized per activation
    pub fn on(&self) -> Duration {
        Duration::from_millis(self.on_ms as u64)
    }

    /// Time de-energized between activations
    pub fn off(&self) -> Duration {
        Duration::from_millis(self.off_ms as u64)
    }

    /// Nominal run time: no off time after the last pulse
    pub fn total_duration(&self) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }
        self.on() * self.count + self.off() * (self.count - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_actuator_is_classic_buzzer() {
        let config = ActuatorConfig::default();
        assert_eq!(config.id.as_str(), "buzzer");
        assert_eq!(config.name.as_str(), "Active Buzzer");
        assert_eq!(config.address, 5);
        assert_eq!(config.polarity(), ActiveLevel::ActiveLow);
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
    }

    #[test]
    fn test_label_capacity() {
        assert!(label::<MAX_ID_LEN>("relay").is_some());
        assert!(label::<4>("relay").is_none());
    }

    #[test]
    fn test_pattern_total_duration() {
        let pattern = PatternConfig::default();
        assert_eq!(pattern.total_duration(), Duration::from_millis(2500));

        let single = PatternConfig {
            count: 1,
            on_ms: 200,
            off_ms: 1000,
        };
        assert_eq!(single.total_duration(), Duration::from_millis(200));

        let none = PatternConfig {
            count: 0,
            ..PatternConfig::default()
        };
        assert_eq!(none.total_duration(), Duration::ZERO);
    }
}
