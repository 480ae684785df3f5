//! Tracing subscriber setup
//!
//! The terminal belongs to the UI, so log output only goes to a file. Without
//! `--log-file` no subscriber is installed and the `tracing` macros are no-ops.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber writing to `log_file_path`
pub fn init(log_file_path: &Path) -> Result<()> {
    let log_file = File::create(log_file_path)
        .with_context(|| format!("Failed to create log file {}", log_file_path.display()))?;

    build_subscriber(log_file)
        .try_init()
        .context("Failed to install the tracing subscriber")?;
    Ok(())
}

/// Subscriber logging to `log_file`, filtered by `RUST_LOG` (default `info`)
pub fn build_subscriber(log_file: File) -> impl tracing::Subscriber + Send + Sync {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_ansi(false);

    tracing_subscriber::registry().with(fmt_layer).with(env_filter)
}
