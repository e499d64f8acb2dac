//! Scan, fingerprint and publish loop
//!
//! The pipeline walks the run root, hashes each file (unless hashing is
//! skipped), builds its [`FileEvent`] and hands it to an [`EventSink`]. Files
//! are handled strictly one after another. Per-file failures are counted and
//! logged; they never stop the loop.

use crate::config::RunConfig;
use crate::sink::{EventSink, PublishOutcome};
use crate::status::ExitStatus;
use fs2mq_scanner::{DiscoveredFile, FileEvent, FileWalker, HashMode, RunContext, ScanError};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Counters for one run
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Regular files taken from the walk
    pub scanned: usize,
    /// Events accepted by the sink
    pub published: usize,
    /// Files that failed to hash or whose event was rejected
    pub failed: usize,
    started: Instant,
    finished_in: Option<Duration>,
}

impl RunStats {
    fn start() -> Self {
        Self {
            scanned: 0,
            published: 0,
            failed: 0,
            started: Instant::now(),
            finished_in: None,
        }
    }

    fn finish(&mut self) {
        self.finished_in = Some(self.started.elapsed());
    }

    /// Wall-clock time of the run (so far, if still running)
    pub fn elapsed(&self) -> Duration {
        self.finished_in.unwrap_or_else(|| self.started.elapsed())
    }

    /// Published events per second
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.published as f64 / secs
        } else {
            0.0
        }
    }

    /// Exit status for a run that got as far as scanning
    pub fn exit_status(&self) -> ExitStatus {
        if self.failed == 0 {
            ExitStatus::Success
        } else {
            ExitStatus::PartialFailure
        }
    }
}

/// What happened to a single file
#[derive(Debug)]
pub enum FileOutcome {
    /// The event was accepted by the sink
    Published,
    /// The file could not be read for hashing
    HashFailed(ScanError),
    /// The sink refused the event
    Rejected(String),
}

/// One run of the pipeline over a single sink
pub struct Pipeline<S: EventSink> {
    context: RunContext,
    hash_mode: HashMode,
    limit: Option<NonZeroUsize>,
    log_every: Option<NonZeroUsize>,
    sink: S,
}

impl<S: EventSink> Pipeline<S> {
    /// Prepare a run; generates the run id
    pub fn new(config: &RunConfig, sink: S) -> Self {
        Self {
            context: RunContext::new(&config.root),
            hash_mode: config.hash_mode(),
            limit: config.limit,
            log_every: config.log_every,
            sink,
        }
    }

    /// Override how files are fingerprinted
    #[must_use]
    pub fn with_hash_mode(mut self, hash_mode: HashMode) -> Self {
        self.hash_mode = hash_mode;
        self
    }

    /// Run-scoped values stamped on every event
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Walk the run root and process every regular file found
    pub fn run(self) -> RunStats {
        let walker = FileWalker::new(&self.context.root);
        self.run_files(walker)
    }

    /// Process `files` in order, then close the sink
    pub fn run_files<I>(mut self, files: I) -> RunStats
    where
        I: IntoIterator<Item = DiscoveredFile>,
    {
        let mut stats = RunStats::start();

        for file in files {
            stats.scanned += 1;

            match self.process(&file) {
                FileOutcome::Published => {
                    stats.published += 1;
                }
                FileOutcome::HashFailed(e) => {
                    warn!(path = %file.path.display(), error = %e, "cannot hash file");
                    stats.failed += 1;
                    continue;
                }
                FileOutcome::Rejected(reason) => {
                    warn!(path = %file.path.display(), reason = %reason, "publish failed");
                    stats.failed += 1;
                    continue;
                }
            }

            if self.limit.is_some_and(|limit| stats.published >= limit.get()) {
                info!(limit = stats.published, "publish limit reached, stopping scan");
                break;
            }

            if self
                .log_every
                .is_some_and(|every| stats.published % every.get() == 0)
            {
                info!(
                    published = stats.published,
                    failed = stats.failed,
                    scanned = stats.scanned,
                    rate = %format!("{:.1}/s", stats.rate()),
                    "progress"
                );
            }
        }

        self.sink.close();
        stats.finish();

        info!(
            run_id = %self.context.run_id,
            published = stats.published,
            failed = stats.failed,
            scanned = stats.scanned,
            elapsed = %format!("{:.2}s", stats.elapsed().as_secs_f64()),
            rate = %format!("{:.1}/s", stats.rate()),
            "done"
        );

        stats
    }

    fn process(&mut self, file: &DiscoveredFile) -> FileOutcome {
        let sha256 = match self.hash_mode.fingerprint(&file.path) {
            Ok(digest) => digest,
            Err(e) => return FileOutcome::HashFailed(e),
        };

        let event = FileEvent::new(&self.context, &file.path, &file.metadata, sha256);
        match self.sink.publish(&event) {
            PublishOutcome::Confirmed => FileOutcome::Published,
            PublishOutcome::Rejected(reason) => FileOutcome::Rejected(reason),
        }
    }
}
