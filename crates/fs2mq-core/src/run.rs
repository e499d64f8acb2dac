//! Run lifecycle
//!
//! `INIT -> CONNECTING -> SCANNING -> DONE`. Dry runs skip `CONNECTING` and
//! never touch the broker. A failed connect or declaration ends the run
//! before any file is scanned.

use crate::config::{BrokerTuning, RunConfig, RunMode};
use crate::error::BrokerResult;
use crate::pipeline::{Pipeline, RunStats};
use crate::sink::{AmqpPublisher, JsonLinesSink};
use std::io::Write;
use tracing::info;

/// Execute one run
///
/// Dry-run events are written to `dry_run_output` as JSON lines. The broker
/// connection, when there is one, is closed before this returns on every
/// path.
pub fn execute<W: Write>(
    config: &RunConfig,
    tuning: BrokerTuning,
    dry_run_output: W,
) -> BrokerResult<RunStats> {
    match &config.mode {
        RunMode::DryRun => {
            info!(root = %config.root.display(), "dry run, events will not be published");
            Ok(Pipeline::new(config, JsonLinesSink::new(dry_run_output)).run())
        }
        RunMode::Publish(broker) => {
            let publisher = AmqpPublisher::connect(broker, tuning)?;
            info!(root = %config.root.display(), "scanning");
            Ok(Pipeline::new(config, publisher).run())
        }
    }
}
