//! Tracing subscriber setup.
//!
//! The terminal belongs to the dialog, so logs only ever go to a file.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{AppError, Result};

/// Build the env filter: `RUST_LOG` when set, else `default_level`.
pub fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_LEVEL))
}

/// Build a subscriber writing to `log_file`.
pub fn build_subscriber(log_file: File, filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync {
    let fmt_layer = fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
}

/// Install the global subscriber, creating the log file's directory if
/// needed.
pub fn init(log_file_path: &Path, default_level: &str) -> Result<()> {
    if let Some(parent) = log_file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(log_file_path)?;
    build_subscriber(file, build_filter(default_level))
        .try_init()
        .map_err(|e| AppError::Logging(format!("subscriber already installed: {}", e)))
}
