//! fs2mq Core - pipeline driver and broker client
//!
//! This crate turns scanner output into published events: it owns the run
//! configuration, the AMQP publisher, the scan loop and exit signaling.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::cast_precision_loss
)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod run;
pub mod sink;
pub mod status;

pub use fs2mq_scanner;

pub use config::{BrokerConfig, BrokerTuning, RunConfig, RunMode};
pub use error::{BrokerError, ConfigError};
pub use pipeline::{FileOutcome, Pipeline, RunStats};
pub use run::execute;
pub use sink::{AmqpPublisher, EventSink, JsonLinesSink, PublishOutcome};
pub use status::ExitStatus;
