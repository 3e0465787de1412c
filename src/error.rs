//! Error type shared by every fallible coordinator operation.

use std::io;
use thiserror::Error;

/// Errors raised while coordinating terminal output.
#[derive(Debug, Error)]
pub enum Error {
    /// A named region was looked up before the layout defined it.
    #[error("region `{0}` is not defined")]
    RegionNotFound(String),

    /// The layout provider refused a region.
    #[error("invalid region `{name}`: {reason}")]
    InvalidRegion {
        /// Region name.
        name: String,
        /// Why it was refused.
        reason: String,
    },

    /// Writing to or querying the terminal failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    /// An actor's channel disconnected.
    #[error("coordinator event channel closed")]
    ChannelClosed,

    /// The tracing subscriber could not be installed.
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
