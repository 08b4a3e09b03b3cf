//! LedStrip host runner.
//!
//! Stands in for the printer host: reads queued commands from stdin, one per
//! line, and drives the LED service's lifecycle hooks around them.
//!
//! ```text
//!   stdin ──▶ HostCommand::from_line ──▶ LedStripService ──▶ HardwareBackend
//!                                              │
//!                                              └──▶ JsonFileSettings
//! ```
//!
//! `@settings {json}` lines save a settings patch, `@shutdown` (or EOF)
//! tears everything down.  Teardown also runs when stdin fails.
#![deny(unused_must_use)]

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use ledstrip::adapters::hardware::HardwareBackend;
use ledstrip::adapters::settings_file::JsonFileSettings;
use ledstrip::app::service::LedStripService;

#[derive(Parser, Debug)]
#[command(version, about = "Drive an LED strip from Marlin M150 commands")]
struct Cli {
    /// Settings file (created on the first save).
    #[arg(short, long, default_value = "ledstrip.json")]
    settings: PathBuf,

    /// Log filter, e.g. `info` or `ledstrip=debug`.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    let store = JsonFileSettings::new(&cli.settings);
    let mut service = LedStripService::new(HardwareBackend::new(), store);

    service.on_after_startup();
    let bound = service.on_settings_initialized();
    info!("{} channel(s) bound from {}", bound.len(), service.store().path().display());

    service
        .serve(io::stdin().lock())
        .context("reading command stream")?;
    Ok(())
}
