//! Tracing subscriber setup.
//!
//! The TUI owns the terminal, so logs go to a file. Filtering follows
//! `RUST_LOG`, defaulting to `info`.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Default log location: `<data_dir>/shellpane/shellpane.log`.
pub fn default_log_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "shellpane")
        .context("Could not determine data directory")?;
    Ok(dirs.data_dir().join("shellpane.log"))
}

/// Install the global subscriber writing to `path`.
pub fn init_global(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;

    build_subscriber(file)
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(())
}

/// Subscriber writing plain (uncoloured) lines to `log_file`.
pub fn build_subscriber(log_file: File) -> impl tracing::Subscriber + Send + Sync {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry().with(fmt_layer).with(env_filter)
}
