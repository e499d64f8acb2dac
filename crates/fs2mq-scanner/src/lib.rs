//! fs2mq Scanner - filesystem discovery for fs2mq
//!
//! This crate walks a directory tree, fingerprints file contents and
//! builds the [`FileEvent`] records that fs2mq publishes.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

pub mod error;
pub mod event;
pub mod fingerprint;
pub mod host;
pub mod walk;

pub use error::{ScanError, ScanResult};
pub use event::{FileEvent, RunContext};
pub use fingerprint::{is_sha256_hex, sha256_file, HashMode, DRY_RUN_SENTINEL};
pub use walk::{DiscoveredFile, FileWalker};
