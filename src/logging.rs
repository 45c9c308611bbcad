//! File-backed `tracing` setup.
//!
//! The terminal owns stdout/stderr while a recipe runs, so log output goes to a
//! file. The filter comes from `RUST_LOG` when set, otherwise `debug` with
//! `RECIPES_DEBUG=1` and `info` without.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;

pub fn default_filter(config: &EnvConfig) -> &'static str {
    if config.debug {
        "debug"
    } else {
        "info"
    }
}

/// Installs the global subscriber and returns the log file path.
///
/// Calling this twice keeps the first subscriber.
pub fn init_file_logging(config: &EnvConfig) -> io::Result<PathBuf> {
    let path = config.log_path();
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config).into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init();

    Ok(path)
}
