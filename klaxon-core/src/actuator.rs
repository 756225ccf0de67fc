//! Actuator sequencer
//!
//! Owns one digital output line and drives it through timed activations.
//! Whatever happens during an activation (normal completion, a failed
//! write, a cancellation request) the line is written back to its safe
//! level before control returns to the caller. Releasing the actuator, or
//! simply dropping it, forces the safe level and hands the line back to
//! the platform.
//!
//! # State machine
//!
//! ```text
//!            bind              activate
//! Unbound ─────────▶ Idle ─────────────▶ Active
//!                     ▲ │                  │
//!                     │ │   elapsed /      │
//!                     │ │   cancelled /    │
//!                     │ │   write failed   │
//!                     │ └──────────────────┘
//!                     │ release
//!                     ▼
//!                  Released
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut buzzer = Actuator::bind(&mut platform, 5, ActiveLevel::ActiveLow, delay)?;
//! buzzer.pulse_sequence(3, Duration::from_millis(500), Duration::from_millis(500), &NeverCancel)?;
//! buzzer.release();
//! ```

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use klaxon_hal::{Level, OutputLine, Platform, PlatformError};
use log::{debug, warn};

use crate::cancel::Cancellation;
use crate::config::{ActuatorConfig, PatternConfig};
use crate::error::{BindError, DriveError};
use crate::level::ActiveLevel;

/// Default granularity at which waits check for cancellation
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Observable actuator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorState {
    /// Bound, line at the safe level
    Idle,
    /// Inside an activation, line at the active level
    Active,
    /// Line forced safe and returned to the platform (terminal)
    Released,
}

/// A single on/off actuator bound to a platform output line
pub struct Actuator<L: OutputLine, D: DelayNs> {
    line: L,
    delay: D,
    polarity: ActiveLevel,
    poll_interval: Duration,
    state: ActuatorState,
}

impl<L: OutputLine, D: DelayNs> Actuator<L, D> {
    /// Bind an actuator to `address` on `platform`
    ///
    /// The line is opened with both its initial and its shutdown level set
    /// to the safe level, so the device stays off from configuration until
    /// after the platform lets go of it.
    ///
    /// # Errors
    ///
    /// `AddressInUse` or `AddressOutOfRange` for addressing problems,
    /// `Platform` if the collaborator is unavailable.
    pub fn bind<P>(
        platform: &mut P,
        address: u8,
        polarity: ActiveLevel,
        delay: D,
    ) -> Result<Self, BindError>
    where
        P: Platform<Line = L>,
    {
        let safe = polarity.safe();
        let line = platform.open_output(address, safe, safe)?;
        debug!("gpio{}: bound {:?}, safe level {:?}", address, polarity, safe);

        Ok(Self {
            line,
            delay,
            polarity,
            poll_interval: DEFAULT_POLL_INTERVAL,
            state: ActuatorState::Idle,
        })
    }

    /// Bind an actuator described by `config`
    pub fn from_config<P>(
        platform: &mut P,
        config: &ActuatorConfig,
        delay: D,
    ) -> Result<Self, BindError>
    where
        P: Platform<Line = L>,
    {
        let actuator = Self::bind(platform, config.address, config.polarity(), delay)?;
        Ok(actuator.with_poll_interval(config.poll_interval()))
    }

    /// Set how often waits check for cancellation
    ///
    /// A zero interval waits each span in one go; cancellation is then only
    /// observed at span boundaries.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Platform address of the bound line
    pub fn address(&self) -> u8 {
        self.line.address()
    }

    /// Polarity of the device
    pub fn active_level(&self) -> ActiveLevel {
        self.polarity
    }

    /// Level restored on every exit path
    pub fn safe_level(&self) -> Level {
        self.polarity.safe()
    }

    /// Last level written to the line
    pub fn level(&self) -> Level {
        self.line.level()
    }

    /// Current state
    pub fn state(&self) -> ActuatorState {
        self.state
    }

    /// Check if the actuator has been released
    pub fn is_released(&self) -> bool {
        self.state == ActuatorState::Released
    }

    /// Cancellation polling interval
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Energize for `duration`, then return to the safe level
    ///
    /// A zero duration energizes and immediately de-energizes. If `cancel`
    /// is already raised the line is not touched.
    ///
    /// # Errors
    ///
    /// - `Energize` if the active write failed (a safe write was still
    ///   attempted)
    /// - `Cancelled` if cancellation was observed during the wait (the line
    ///   has been forced safe)
    /// - `Restore` if the closing safe write failed
    /// - `Released` if the actuator was released
    pub fn activate<C>(&mut self, duration: Duration, cancel: &C) -> Result<(), DriveError>
    where
        C: Cancellation + ?Sized,
    {
        self.ensure_bound()?;
        if cancel.is_cancelled() {
            return Err(DriveError::Cancelled);
        }

        self.state = ActuatorState::Active;
        if let Err(e) = self.line.write(self.polarity.active()) {
            warn!("gpio{}: energize failed: {}", self.address(), e);
            // The energize error is what the caller needs; a second failure
            // is logged by restore()
            let _ = self.restore();
            return Err(DriveError::Energize(e));
        }

        let waited = self.wait(duration, cancel);
        self.restore().map_err(DriveError::Restore)?;
        waited
    }

    /// Force the safe level now
    ///
    /// # Errors
    ///
    /// `Restore` if the write failed, `Released` if the actuator was
    /// released.
    pub fn deactivate(&mut self) -> Result<(), DriveError> {
        self.ensure_bound()?;
        self.restore().map_err(DriveError::Restore)
    }

    /// Perform `count` activations of `on`, separated by `off`
    ///
    /// There is no trailing wait after the last activation. `count = 0`
    /// performs no writes. The first error aborts the sequence; nothing is
    /// retried.
    pub fn pulse_sequence<C>(
        &mut self,
        count: u32,
        on: Duration,
        off: Duration,
        cancel: &C,
    ) -> Result<(), DriveError>
    where
        C: Cancellation + ?Sized,
    {
        self.pulse_sequence_with(count, on, off, cancel, |_| {})
    }

    /// Like [`pulse_sequence`](Self::pulse_sequence), calling `on_pulse`
    /// with the 1-based pulse number right before each activation
    pub fn pulse_sequence_with<C, F>(
        &mut self,
        count: u32,
        on: Duration,
        off: Duration,
        cancel: &C,
        mut on_pulse: F,
    ) -> Result<(), DriveError>
    where
        C: Cancellation + ?Sized,
        F: FnMut(u32),
    {
        self.ensure_bound()?;

        for n in 1..=count {
            if n > 1 {
                self.wait(off, cancel)?;
            }
            if cancel.is_cancelled() {
                return Err(DriveError::Cancelled);
            }
            on_pulse(n);
            self.activate(on, cancel)?;
        }

        debug!("gpio{}: {} pulse(s) complete", self.address(), count);
        Ok(())
    }

    /// Run a configured pattern
    pub fn run_pattern<C, F>(
        &mut self,
        pattern: &PatternConfig,
        cancel: &C,
        on_pulse: F,
    ) -> Result<(), DriveError>
    where
        C: Cancellation + ?Sized,
        F: FnMut(u32),
    {
        self.pulse_sequence_with(pattern.count, pattern.on(), pattern.off(), cancel, on_pulse)
    }

    /// Force the safe level and return the line to the platform
    ///
    /// The safe write is issued even if the line already reads safe.
    /// Calling this on a released actuator is a no-op.
    pub fn release(&mut self) {
        if self.is_released() {
            return;
        }

        // Failure is already logged; the platform's shutdown level is the
        // remaining fallback
        let _ = self.restore();
        self.line.close();
        self.state = ActuatorState::Released;
        debug!("gpio{}: released", self.address());
    }

    fn ensure_bound(&self) -> Result<(), DriveError> {
        if self.is_released() {
            Err(DriveError::Released)
        } else {
            Ok(())
        }
    }

    /// Write the safe level; the state returns to Idle either way
    fn restore(&mut self) -> Result<(), PlatformError> {
        let result = self.line.write(self.polarity.safe());
        self.state = ActuatorState::Idle;
        if let Err(e) = &result {
            warn!("gpio{}: failed to restore safe level: {}", self.address(), e);
        }
        result
    }

    /// Block for `duration`, checking `cancel` every poll interval
    fn wait<C>(&mut self, duration: Duration, cancel: &C) -> Result<(), DriveError>
    where
        C: Cancellation + ?Sized,
    {
        let mut remaining = duration;
        while !remaining.is_zero() {
            if cancel.is_cancelled() {
                return Err(DriveError::Cancelled);
            }
            let slice = if self.poll_interval.is_zero() {
                remaining
            } else {
                remaining.min(self.poll_interval)
            };
            self.sleep(slice);
            remaining -= slice;
        }

        if cancel.is_cancelled() {
            return Err(DriveError::Cancelled);
        }
        Ok(())
    }

    fn sleep(&mut self, duration: Duration) {
        // DelayNs takes u32 nanoseconds (~4.29 s)
        let mut ns = duration.as_nanos();
        while ns > 0 {
            let chunk = ns.min(u32::MAX as u128) as u32;
            self.delay.delay_ns(chunk);
            ns -= chunk as u128;
        }
    }
}

impl<L: OutputLine, D: DelayNs> Drop for Actuator<L, D> {
    fn drop(&mut self) {
        if !self.is_released() {
            warn!("gpio{}: dropped while bound, forcing safe level", self.address());
        }
        self.release();
    }
}
