//! Klaxon - active buzzer demo
//!
//! Binds one GPIO pin on a Raspberry Pi and beeps an active buzzer through
//! it. With no arguments it runs the embedded default configuration:
//! GPIO5, active-low, three 500 ms beeps separated by 500 ms of silence.
//!
//! Prints `Beep <n>` on stdout for every activation; logs go to stderr.
//! Exits non-zero on any bind, drive or configuration error, and on
//! Ctrl-C (after the buzzer has been switched off).

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use klaxon_hal::mock::MockPlatform;
use klaxon_hal_rppal::{Delay, RppalPlatform};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod run;

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "klaxon")]
#[command(version)]
#[command(about = "Beep an active buzzer (or any on/off actuator) on a GPIO pin", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults to the embedded configuration)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Pin override, e.g. "gpio5" or "!gpio5" for an active-low device
    #[arg(long, value_name = "PIN")]
    pin: Option<String>,

    /// Number of beeps
    #[arg(long)]
    count: Option<u32>,

    /// Beep length in milliseconds
    #[arg(long, value_name = "MS")]
    on_ms: Option<u32>,

    /// Silence between beeps in milliseconds
    #[arg(long, value_name = "MS")]
    off_ms: Option<u32>,

    /// Drive an in-memory GPIO instead of the hardware
    #[arg(long)]
    simulate: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Load the configuration and apply command-line overrides
    fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = config::load(self.config.as_deref())?;

        if let Some(pin) = &self.pin {
            settings.set_pin(pin)?;
        }
        if let Some(count) = self.count {
            settings.pattern.count = count;
        }
        if let Some(on_ms) = self.on_ms {
            settings.pattern.on_ms = on_ms;
        }
        if let Some(off_ms) = self.off_ms {
            settings.pattern.off_ms = off_ms;
        }
        Ok(settings)
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Also captures `log` records from the library crates
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = cli.settings()?;
    info!(
        "{}: {} x {} ms on / {} ms off",
        settings.actuator.name,
        settings.pattern.count,
        settings.pattern.on_ms,
        settings.pattern.off_ms
    );

    if cli.simulate {
        let platform = MockPlatform::new();
        let observer = platform.clone();
        let result = run::run(platform, settings, Delay::new(), tokio::signal::ctrl_c()).await;
        for write in observer.history() {
            info!(
                "simulated gpio{} -> {:?} at {:?}{}",
                write.address,
                write.level,
                write.at,
                if write.ok { "" } else { " (failed)" }
            );
        }
        result
    } else {
        let platform = RppalPlatform::new().context("failed to open the Raspberry Pi GPIO")?;
        run::run(platform, settings, Delay::new(), tokio::signal::ctrl_c()).await
    }
}
