//! Error types for the fs2mq scanner

use std::path::PathBuf;
use thiserror::Error;

/// Result type for scanner operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur while scanning a single file
#[derive(Error, Debug)]
pub enum ScanError {
    /// The file could not be opened
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading failed part-way through the file
    #[error("read error on {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize an event
    #[error("Failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ScanError {
    /// Path of the file the error refers to, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Open { path, .. } | Self::Read { path, .. } => Some(path),
            Self::Serialize(_) => None,
        }
    }
}
