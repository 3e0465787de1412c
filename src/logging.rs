//! Logging setup.
//!
//! The terminal belongs to the coordinator, so log output goes to a file.

use crate::error::{Error, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber that appends to `path`.
///
/// `RUST_LOG` takes precedence; otherwise `tidemark=<default_level>` is used.
pub fn init_file_logging(path: impl AsRef<Path>, default_level: &str) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tidemark={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
