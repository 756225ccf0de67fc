//! Running a pattern
//!
//! The sequencer blocks for the whole pattern, so it runs on a blocking
//! worker while the async side waits for either completion or an
//! interrupt (Ctrl-C in the binary). An interrupt raises the cancel flag;
//! the sequencer then forces the line safe and the cancellation surfaces
//! as an error.

use std::future::Future;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;
use embedded_hal::delay::DelayNs;
use klaxon_core::{Actuator, CancelFlag, DriveError, PatternConfig};
use klaxon_hal::{OutputLine, Platform};
use tracing::{debug, info, warn};

use crate::config::Settings;

/// Run the pattern on a bound actuator, printing `Beep <n>` per pulse
///
/// The actuator is released before returning, whatever the outcome.
pub fn beep<L, D, W>(
    mut actuator: Actuator<L, D>,
    pattern: &PatternConfig,
    cancel: &CancelFlag,
    out: &mut W,
) -> Result<(), DriveError>
where
    L: OutputLine,
    D: DelayNs,
    W: Write,
{
    let result = actuator.run_pattern(pattern, cancel, |n| {
        if let Err(e) = writeln!(out, "Beep {}", n).and_then(|_| out.flush()) {
            warn!("failed to write to stdout: {}", e);
        }
    });
    actuator.release();
    result
}

/// Bind the configured actuator on `platform` and run its pattern
///
/// The pattern is cancelled when `interrupt` resolves with `Ok`. An `Err`
/// from it only means interrupts cannot be observed; the pattern then
/// runs to completion.
pub async fn run<P, D, I>(
    mut platform: P,
    settings: Settings,
    delay: D,
    interrupt: I,
) -> anyhow::Result<()>
where
    P: Platform,
    P::Line: Send + 'static,
    D: DelayNs + Send + 'static,
    I: Future<Output = io::Result<()>>,
{
    let Settings { actuator, pattern } = settings;

    let bound = Actuator::from_config(&mut platform, &actuator, delay).with_context(|| {
        format!(
            "failed to bind {} ({}) on gpio{}",
            actuator.name, actuator.id, actuator.address
        )
    })?;
    info!(
        "{} bound to gpio{} ({:?})",
        actuator.name, actuator.address, actuator.active_level
    );

    let cancel = Arc::new(CancelFlag::new());
    let flag = Arc::clone(&cancel);
    let mut task = tokio::task::spawn_blocking(move || {
        beep(bound, &pattern, &flag, &mut std::io::stdout().lock())
    });

    let joined = tokio::select! {
        joined = &mut task => joined,
        signal = interrupt => {
            match signal {
                Ok(()) => {
                    warn!("interrupt received, forcing {} off", actuator.name);
                    cancel.cancel();
                }
                Err(e) => warn!("cannot listen for interrupts: {}", e),
            }
            task.await
        }
    };

    let result = joined.context("sequencer worker failed")?;
    match &result {
        Ok(()) => debug!("{} pattern complete", actuator.name),
        Err(e) if e.is_cancelled() => info!("{} stopped, line is safe", actuator.name),
        Err(e) => warn!("{} fault: {}", actuator.name, e),
    }
    result.with_context(|| format!("{} sequence failed", actuator.name))
}
