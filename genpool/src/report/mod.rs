//! # Report Sinks
//!
//! Implementations of [`ReportSink`](genpool_api::ReportSink) used by the binary.
//! Each sink handles the destinations it is responsible for and ignores the rest,
//! so a [`CompositeSink`] can offer every report to all of them.
//!
//! - [`LogSink`]: persistent log, through `tracing`
//! - [`ConsoleSink`]: interactive status line and final statistics
//! - [`ReportFileSink`]: structured final report file

mod composite;
mod console;
mod file;
mod log;

pub use composite::CompositeSink;
pub use console::ConsoleSink;
pub use file::ReportFileSink;
pub use log::LogSink;

use genpool_api::{Destination, RunConfig};

/// Destinations of the periodic status reports for `config`.
///
/// Status lines reach the console unless they were explicitly silenced.
pub fn status_destinations(config: &RunConfig) -> Vec<Destination> {
    let console = if config.quiet_status {
        Destination::Suppressed
    } else {
        Destination::Console
    };
    vec![Destination::Log, console]
}

/// Destinations of the final report.
pub fn final_destinations(_config: &RunConfig) -> Vec<Destination> {
    vec![Destination::Log, Destination::Console]
}
