//! File discovery events
//!
//! A [`FileEvent`] describes one regular file found during a run. Events are
//! built once from traversal output plus the run-scoped [`RunContext`],
//! serialized once, and then dropped.
//!
//! The JSON field order follows the struct field order and is part of the
//! wire contract consumed downstream.

use crate::error::ScanResult;
use crate::host::host_name;
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Values shared by every event of a single run
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Identifier generated once per run
    pub run_id: Uuid,
    /// Machine performing the scan
    pub host: String,
    /// Absolute root of the scan
    pub root: PathBuf,
}

impl RunContext {
    /// Create a context with a fresh run id and the current hostname
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            host: host_name(),
            root: root.into(),
        }
    }
}

/// One discovered file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEvent {
    pub run_id: Uuid,
    pub host: String,
    pub root: String,
    pub path: String,
    pub size: u64,
    pub mtime_epoch: i64,
    /// Lowercase hex SHA-256, or `DRY_RUN` when hashing was skipped
    pub sha256: String,
}

impl FileEvent {
    /// Build the event for `path` from its metadata and digest
    pub fn new(context: &RunContext, path: &Path, metadata: &Metadata, sha256: String) -> Self {
        Self {
            run_id: context.run_id,
            host: context.host.clone(),
            root: context.root.to_string_lossy().into_owned(),
            path: path.to_string_lossy().into_owned(),
            size: metadata.len(),
            mtime_epoch: metadata.modified().map_or(0, epoch_seconds),
            sha256,
        }
    }

    /// Serialize to a single-line JSON object
    pub fn to_json(&self) -> ScanResult<String> {
        serde_json::to_string(self).map_err(Into::into)
    }

    /// Serialize to UTF-8 JSON bytes for a message body
    pub fn to_json_bytes(&self) -> ScanResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(Into::into)
    }
}

/// Whole seconds since the Unix epoch, truncated toward zero
///
/// Times before 1970 are negative. Values beyond the `i64` range saturate.
pub fn epoch_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_secs()).map_or(i64::MIN, |secs| -secs),
    }
}
