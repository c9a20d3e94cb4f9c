//! Tracing subscriber setup
//!
//! The chart owns the terminal, so log output goes to a file instead of
//! stderr. The filter comes from `RUST_LOG` and defaults to `info`.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global tracing subscriber writing to `log_file_path`.
///
/// Fails if the log file cannot be created or a global subscriber is
/// already installed.
pub fn init_global(log_file_path: &Path) -> anyhow::Result<()> {
    let log_file = File::create(log_file_path)?;
    build_subscriber(log_file, default_filter()).try_init()?;
    Ok(())
}

/// `RUST_LOG` if set and valid, `info` otherwise.
pub fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Build a subscriber that writes plain-text events to `log_file`.
///
/// Shared between the binary and tests.
pub fn build_subscriber(
    log_file: File,
    env_filter: EnvFilter,
) -> impl tracing::Subscriber + Send + Sync {
    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry().with(fmt_layer).with(env_filter)
}
