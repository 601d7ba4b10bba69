//! # thrive
//!
//! Entry point for the `thrive` CLI.
//!
//! Configuration is resolved first (`--config`, then `$THRIVE_CONFIG`, then
//! `./thrive.toml`, then defaults) so the log filter it carries can seed the
//! tracing subscriber. `THRIVE_LOG` overrides the file in every case and
//! `RUST_LOG` still wins when set.

#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![forbid(clippy::panic)]
#![deny(clippy::expect_used)]

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use thrive::cli::Cli;
use thrive::commands;
use thrive_core::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?
            .with_env_overrides(),
        None => Config::from_env().context("Failed to resolve configuration")?,
    };

    init_tracing(&config.log_filter);
    tracing::debug!(?config, "Configuration resolved");

    let output = commands::execute(&cli.command, &config)?;
    print!("{output}");
    Ok(())
}

/// Initialize tracing subscriber with environment filter.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
