//! Error types for fs2mq runs
//!
//! Only configuration and broker-setup errors are fatal to a run. Per-file
//! failures are reported as values by the pipeline, not through these types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for broker operations
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Invalid or missing run configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting is unset or empty
    #[error("Missing required env var: {0}")]
    MissingVar(&'static str),

    /// Root directory does not exist
    #[error("root does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    /// Root exists but is not a directory
    #[error("root is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),

    /// Root could not be resolved to an absolute path
    #[error("cannot resolve root {}: {source}", path.display())]
    RootUnresolvable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to set up or talk to the broker
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The AMQP address could not be parsed
    #[error("invalid AMQP URL: {0}")]
    InvalidUrl(String),

    /// The async runtime backing the client could not start
    #[error("failed to start broker runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// Connecting or opening a channel failed
    #[error("connection failed: {0}")]
    Connect(#[source] lapin::Error),

    /// Declaring or binding topology failed
    #[error("failed to declare {what} '{name}': {source}")]
    Declare {
        what: &'static str,
        name: String,
        #[source]
        source: lapin::Error,
    },

    /// A bounded wait on the broker elapsed
    #[error("timed out after {secs}s waiting for broker to {operation}")]
    Timeout { operation: &'static str, secs: u64 },

    /// Publishing or confirming a message failed at the protocol level
    #[error("publish failed: {0}")]
    Publish(#[source] lapin::Error),
}
