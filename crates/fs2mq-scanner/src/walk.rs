//! Recursive directory traversal
//!
//! Walks a root directory and yields every regular file beneath it.
//! Symbolic links are never followed and never yielded. Errors listing a
//! directory or stat-ing an entry are logged and skipped so that a single
//! unreadable subtree cannot abort the scan.
//!
//! Entries come out in directory-listing order, which the platform does
//! not guarantee to be stable.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A regular file found during traversal
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Path of the file (under the walk root)
    pub path: PathBuf,
    /// Metadata captured when the file was classified
    pub metadata: Metadata,
}

/// Lazy iterator over the regular files of a directory tree
pub struct FileWalker {
    inner: walkdir::IntoIter,
    warnings: usize,
}

impl FileWalker {
    /// Start a walk rooted at `root`
    pub fn new(root: impl AsRef<Path>) -> Self {
        let inner = WalkDir::new(root.as_ref()).follow_links(false).into_iter();
        Self { inner, warnings: 0 }
    }

    /// Number of entries skipped because of an OS error so far
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    fn record_walk_error(&mut self, err: &walkdir::Error) {
        self.warnings += 1;
        match err.path() {
            Some(path) => warn!(path = %path.display(), error = %err, "walk error"),
            None => warn!(error = %err, "walk error"),
        }
    }
}

impl Iterator for FileWalker {
    type Item = DiscoveredFile;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    self.record_walk_error(&err);
                    continue;
                }
            };

            // The listing may report a link as a plain file on some filesystems,
            // so the link check comes first.
            let file_type = entry.file_type();
            if file_type.is_symlink() {
                debug!(path = %entry.path().display(), "skipping symlink");
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) if metadata.is_file() => {
                    return Some(DiscoveredFile {
                        path: entry.into_path(),
                        metadata,
                    });
                }
                Ok(_) => {}
                Err(err) => {
                    self.warnings += 1;
                    warn!(
                        path = %entry.path().display(),
                        error = %err,
                        "cannot access file"
                    );
                }
            }
        }
    }
}
