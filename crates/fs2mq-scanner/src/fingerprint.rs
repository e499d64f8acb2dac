//! Streaming content fingerprints

use crate::error::{ScanError, ScanResult};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Digest reported in place of a hash when hashing is skipped
pub const DRY_RUN_SENTINEL: &str = "DRY_RUN";

/// Read buffer size (1 MiB); bounds peak memory per file
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// How file contents are fingerprinted during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashMode {
    /// Hash the full contents with SHA-256
    #[default]
    Sha256,
    /// Do not read the file; report [`DRY_RUN_SENTINEL`]
    Skip,
}

impl HashMode {
    /// Fingerprint `path` according to this mode
    pub fn fingerprint(self, path: &Path) -> ScanResult<String> {
        match self {
            Self::Sha256 => sha256_file(path),
            Self::Skip => Ok(DRY_RUN_SENTINEL.to_string()),
        }
    }
}

/// Compute the SHA-256 of a file as 64 lowercase hex characters
///
/// The file is read in [`CHUNK_SIZE`] chunks, so memory use does not grow
/// with file size.
pub fn sha256_file(path: &Path) -> ScanResult<String> {
    let mut file = File::open(path).map_err(|source| ScanError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let bytes_read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(ScanError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Whether `digest` has the shape of a finished SHA-256 hex digest
pub fn is_sha256_hex(digest: &str) -> bool {
    digest.len() == 64
        && digest
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
