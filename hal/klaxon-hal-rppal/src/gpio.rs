//! GPIO output lines on the Raspberry Pi
//!
//! rppal already refuses to hand out a pin twice and knows which BCM pins
//! exist on the detected board, so this module only maps its errors and
//! implements the shutdown-level contract.

use klaxon_hal::{Level, OutputLine, Platform, PlatformError};
use rppal::gpio::{self, Gpio, OutputPin};

fn to_rppal(level: Level) -> gpio::Level {
    match level {
        Level::Low => gpio::Level::Low,
        Level::High => gpio::Level::High,
    }
}

/// Map an rppal error for `address` to a platform error
fn map_error(address: u8, err: gpio::Error) -> PlatformError {
    match err {
        gpio::Error::PinUsed(pin) => PlatformError::AddressInUse(pin),
        gpio::Error::PinNotAvailable(pin) => PlatformError::InvalidAddress(pin),
        other => {
            log::warn!("rppal: gpio{} unavailable: {}", address, other);
            PlatformError::Unavailable
        }
    }
}

/// GPIO provider for the Raspberry Pi
pub struct RppalPlatform {
    gpio: Gpio,
}

impl RppalPlatform {
    /// Detect the board and open the GPIO peripheral
    ///
    /// # Errors
    ///
    /// `PlatformError::Unavailable` if this is not a supported Raspberry Pi
    /// or `/dev/gpiomem` cannot be opened.
    pub fn new() -> Result<Self, PlatformError> {
        let gpio = Gpio::new().map_err(|e| {
            log::warn!("rppal: failed to open GPIO: {}", e);
            PlatformError::Unavailable
        })?;
        Ok(Self { gpio })
    }
}

impl Platform for RppalPlatform {
    type Line = RppalLine;

    fn open_output(
        &mut self,
        address: u8,
        initial: Level,
        shutdown: Level,
    ) -> Result<RppalLine, PlatformError> {
        let pin = self.gpio.get(address).map_err(|e| map_error(address, e))?;
        let mut pin = match initial {
            Level::High => pin.into_output_high(),
            Level::Low => pin.into_output_low(),
        };
        // The shutdown level is applied explicitly in close(); rppal's
        // reset-on-drop would revert the pin to an input instead.
        pin.set_reset_on_drop(false);
        log::debug!("rppal: gpio{} configured as output at {:?}", address, initial);

        Ok(RppalLine {
            address,
            level: initial,
            shutdown,
            pin: Some(pin),
        })
    }
}

/// Output line on a Raspberry Pi GPIO
pub struct RppalLine {
    address: u8,
    level: Level,
    shutdown: Level,
    /// `None` once closed
    pin: Option<OutputPin>,
}

impl OutputLine for RppalLine {
    fn address(&self) -> u8 {
        self.address
    }

    fn write(&mut self, level: Level) -> Result<(), PlatformError> {
        let pin = self
            .pin
            .as_mut()
            .ok_or(PlatformError::Closed(self.address))?;
        pin.write(to_rppal(level));
        self.level = level;
        Ok(())
    }

    fn level(&self) -> Level {
        self.level
    }

    fn close(&mut self) {
        if let Some(mut pin) = self.pin.take() {
            pin.write(to_rppal(self.shutdown));
            self.level = self.shutdown;
            log::debug!("rppal: gpio{} released at {:?}", self.address, self.shutdown);
        }
    }

    fn is_closed(&self) -> bool {
        self.pin.is_none()
    }
}

impl Drop for RppalLine {
    fn drop(&mut self) {
        self.close();
    }
}
