use tracing::info;

use genpool_api::{Destination, Report, ReportKind, ReportSink, SinkError};

use crate::logging::REPORT_TARGET;

/// Writes reports to the persistent log as `info` events on [`REPORT_TARGET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn emit(&self, report: &Report, destination: Destination) -> Result<(), SinkError> {
        if destination != Destination::Log {
            return Ok(());
        }

        let snapshot = &report.snapshot;
        match report.kind {
            ReportKind::Status => info!(
                target: REPORT_TARGET,
                generated = snapshot.generated,
                found = snapshot.found,
                active_workers = snapshot.active_workers,
                "{}",
                report
            ),
            ReportKind::Final => info!(
                target: REPORT_TARGET,
                generated = snapshot.generated,
                found = snapshot.found,
                elapsed_secs = snapshot.elapsed_secs,
                "{}",
                report
            ),
        }
        Ok(())
    }
}
