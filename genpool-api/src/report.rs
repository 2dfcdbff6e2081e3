//! # Reports
//!
//! The coordinator emits two kinds of reports: a status report on every monitor
//! tick and one final report when the run ends. Each report is offered to a
//! [`ReportSink`] once per configured [`Destination`].

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::errors::SinkError;
use crate::snapshot::StatusSnapshot;

/// Where a report is meant to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// The persistent run log.
    Log,
    /// The interactive console.
    Console,
    /// Nowhere; sinks must accept and discard it.
    Suppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Periodic sample taken by the monitor.
    Status,
    /// Emitted exactly once when the run is done.
    Final,
}

/// A snapshot tagged with the reason it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Report {
    pub kind: ReportKind,
    pub snapshot: StatusSnapshot,
}

impl Report {
    pub fn status(snapshot: StatusSnapshot) -> Self {
        Self { kind: ReportKind::Status, snapshot }
    }

    pub fn final_report(snapshot: StatusSnapshot) -> Self {
        Self { kind: ReportKind::Final, snapshot }
    }

    pub fn is_final(&self) -> bool {
        self.kind == ReportKind::Final
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ReportKind::Status => write!(f, "{}", self.snapshot),
            ReportKind::Final => write!(f, "{}", self.snapshot.final_line()),
        }
    }
}

/// Receives reports from the coordinator.
///
/// Implementations must not block for long: `emit` is called from the monitor
/// task between ticks. Errors are logged by the caller and never abort a run.
pub trait ReportSink: fmt::Debug + Send + Sync {
    fn emit(&self, report: &Report, destination: Destination) -> Result<(), SinkError>;
}

impl<S: ReportSink + ?Sized> ReportSink for Arc<S> {
    fn emit(&self, report: &Report, destination: Destination) -> Result<(), SinkError> {
        (**self).emit(report, destination)
    }
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn emit(&self, report: &Report, destination: Destination) -> Result<(), SinkError> {
        (**self).emit(report, destination)
    }
}
