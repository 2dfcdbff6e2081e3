//! # Error Types
//!
//! Two families of errors exist in a run:
//!
//! - [`PoolError`]: startup failures. These are fatal, surface before (or while)
//!   units are spawned and terminate the process with a non-zero status.
//! - [`SinkError`]: reporting failures. These are isolated: the coordinator logs
//!   them and keeps running.
//!
//! Failures inside a unit are neither: they are absorbed by the unit's thread and
//! only show up as a lower `active_workers` count and in the final statistics.

use thiserror::Error;

/// Fatal errors raised while setting up a run.
#[derive(Error, Debug)]
pub enum PoolError {
    /// The run configuration cannot be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A worker unit could not be started.
    #[error("Failed to spawn unit {unit_id}: {reason}")]
    Spawn { unit_id: usize, reason: String },

    /// The logging system could not be initialised.
    #[error("Logging setup failed: {0}")]
    Logging(String),

    /// A file required at startup could not be opened.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors produced by a [`ReportSink`](crate::report::ReportSink).
#[derive(Error, Debug)]
pub enum SinkError {
    /// Writing the report failed.
    #[error("Report write failed: {0}")]
    Io(#[from] std::io::Error),

    /// The report could not be serialised.
    #[error("Report serialisation failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The sink no longer accepts reports.
    #[error("Report sink is closed")]
    Closed,
}
