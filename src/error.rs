use std::{io, path::PathBuf};
use thiserror::Error;

/// A telemetry frame that could not be decoded.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("failed to parse frame: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("malformed {event} event at index {index}: {reason}")]
    Malformed {
        event: &'static str,
        index: usize,
        reason: String,
    },
    #[error("unknown unit tag {0}")]
    UnknownUnitTag(u64),
    #[error("unknown player tag {0}")]
    UnknownPlayerTag(u64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse strategy config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read strategy config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
