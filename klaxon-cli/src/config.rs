//! Configuration loading
//!
//! Reads the TOML configuration file (or the embedded default) and turns
//! it into the core configuration types. Pins use the same string format
//! everywhere: `gpio5` for an active-high device, `!gpio5` for an
//! active-low one.

use std::fs;
use std::path::{Path, PathBuf};

use klaxon_core::config::{label, MAX_ID_LEN, MAX_NAME_LEN};
use klaxon_core::{ActiveLevel, ActuatorConfig, PatternConfig};
use klaxon_hal::parse_pin_string;
use serde::Deserialize;
use thiserror::Error;

/// Embedded default configuration (compiled into the binary)
pub const EMBEDDED_CONFIG: &str = include_str!("../klaxon.toml");

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML syntax or schema error
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// Pin string not understood
    #[error("invalid pin {0:?}, expected e.g. \"gpio5\" or \"!gpio5\"")]
    InvalidPin(String),
    /// Label exceeds its fixed capacity
    #[error("{field} {value:?} is longer than {max} characters")]
    LabelTooLong {
        field: &'static str,
        value: String,
        max: usize,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    actuator: ActuatorSection,
    #[serde(default)]
    pattern: PatternConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ActuatorSection {
    id: Option<String>,
    name: Option<String>,
    pin: String,
    poll_interval_ms: Option<u32>,
}

/// Everything needed for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub actuator: ActuatorConfig,
    pub pattern: PatternConfig,
}

impl Settings {
    /// Replace the pin (address and polarity) from a pin string
    pub fn set_pin(&mut self, spec: &str) -> Result<(), ConfigError> {
        let pin = parse_pin_string(spec).ok_or_else(|| ConfigError::InvalidPin(spec.into()))?;
        self.actuator.address = pin.pin;
        self.actuator.active_level = ActiveLevel::from_inverted(pin.inverted);
        Ok(())
    }
}

/// Parse a TOML configuration
pub fn parse(input: &str) -> Result<Settings, ConfigError> {
    let file: FileConfig = toml::from_str(input)?;
    let section = file.actuator;

    let mut actuator = ActuatorConfig::default();
    if let Some(id) = section.id {
        actuator.id = label(&id).ok_or_else(|| ConfigError::LabelTooLong {
            field: "id",
            value: id,
            max: MAX_ID_LEN,
        })?;
    }
    if let Some(name) = section.name {
        actuator.name = label(&name).ok_or_else(|| ConfigError::LabelTooLong {
            field: "name",
            value: name,
            max: MAX_NAME_LEN,
        })?;
    }
    if let Some(poll) = section.poll_interval_ms {
        actuator.poll_interval_ms = poll;
    }

    let mut settings = Settings {
        actuator,
        pattern: file.pattern,
    };
    settings.set_pin(&section.pin)?;
    Ok(settings)
}

/// Load configuration from `path`, or the embedded default if `None`
pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            parse(&text)
        }
        None => parse(EMBEDDED_CONFIG),
    }
}
