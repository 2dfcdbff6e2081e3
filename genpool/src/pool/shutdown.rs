//! # Shutdown Controller
//!
//! Waits for the pool to finish and produces the single final report.
//!
//! ## States
//! - `Running`: waiting for every unit's exit notification or for the interrupt
//! - `Draining`: an interrupt arrived; units are asked to stop, given at most the
//!   drain grace to comply, then retired forcibly and detached
//! - `Done`: exited threads are joined and the final report is emitted
//!
//! Every path (normal completion, interrupt, units that panicked) ends in the same
//! `Done` step, which runs once because [`ShutdownController::run`] consumes the
//! controller. An attached monitor is stopped and awaited for at most
//! [`MONITOR_STOP_GRACE`] before the final report; a monitor stuck in a sink is
//! left behind rather than delaying the final report.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use flume::Receiver;
use serde::Serialize;
use tokio::time;
use tracing::{debug, info, warn};

use genpool_api::{CounterSet, Destination, Report, ReportSink, StatusSnapshot};

use super::monitor::MonitorHandle;
use super::supervisor::Supervisor;
use super::unit::{UnitExit, UnitOutcome};

/// Longest the final report waits for the monitor to wind down.
pub const MONITOR_STOP_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    Draining,
    Done,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    /// Every unit returned on its own.
    Completed,
    /// The run was cut short by an interrupt.
    Interrupted,
}

/// Result of a finished run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    /// The snapshot carried by the final report.
    pub snapshot: StatusSnapshot,
    /// Outcome of each unit, in unit order.
    pub units: Vec<Option<UnitOutcome>>,
    /// Units the controller had to retire on their behalf.
    pub force_retired: usize,
}

impl RunSummary {
    pub fn panicked_units(&self) -> usize {
        self.units
            .iter()
            .filter(|u| matches!(u, Some(UnitOutcome::Panicked(_))))
            .count()
    }
}

pub struct ShutdownController {
    state: ShutdownState,
    supervisor: Supervisor,
    exits: Receiver<UnitExit>,
    counters: Arc<CounterSet>,
    start: Instant,
    drain_grace: Duration,
    sink: Arc<dyn ReportSink>,
    destinations: Vec<Destination>,
    monitor: Option<MonitorHandle>,
}

impl ShutdownController {
    pub fn new(
        supervisor: Supervisor,
        exits: Receiver<UnitExit>,
        counters: Arc<CounterSet>,
        start: Instant,
        drain_grace: Duration,
        sink: Arc<dyn ReportSink>,
        destinations: Vec<Destination>,
    ) -> Self {
        Self {
            state: ShutdownState::Running,
            supervisor,
            exits,
            counters,
            start,
            drain_grace,
            sink,
            destinations,
            monitor: None,
        }
    }

    /// Attach the monitor of this run.
    pub fn with_monitor(mut self, monitor: MonitorHandle) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn state(&self) -> ShutdownState {
        self.state
    }

    /// Drive the run to `Done`, treating completion of `interrupt` as the
    /// external interrupt signal.
    pub async fn run<I>(mut self, interrupt: I) -> RunSummary
    where
        I: Future<Output = ()>,
    {
        let interrupted = self.wait_for_units(interrupt).await;

        let mut force_retired = 0;
        if interrupted {
            self.transition(ShutdownState::Draining);
            force_retired = self.drain().await;
        } else if self.supervisor.outstanding() > 0 {
            // Exit channel closed while units were still registered.
            force_retired = self.supervisor.force_retire_outstanding();
        }

        self.transition(ShutdownState::Done);
        let outcome = if interrupted {
            RunOutcome::Interrupted
        } else {
            RunOutcome::Completed
        };
        self.finish(outcome, force_retired).await
    }

    /// `Running` state. Returns `true` if the interrupt fired first.
    async fn wait_for_units<I>(&mut self, interrupt: I) -> bool
    where
        I: Future<Output = ()>,
    {
        tokio::pin!(interrupt);

        while self.supervisor.outstanding() > 0 {
            tokio::select! {
                biased;
                _ = &mut interrupt => {
                    info!(outstanding = self.supervisor.outstanding(), "Interrupt received");
                    return true;
                }
                exit = self.exits.recv_async() => match exit {
                    Ok(exit) => {
                        self.supervisor.record_exit(exit);
                    }
                    Err(_) => {
                        warn!("Unit exit channel closed with units outstanding");
                        break;
                    }
                }
            }
        }
        false
    }

    /// `Draining` state. Returns the number of units retired forcibly.
    async fn drain(&mut self) -> usize {
        self.supervisor.request_stop_all();

        let deadline = time::Instant::now() + self.drain_grace;
        while self.supervisor.outstanding() > 0 {
            match time::timeout_at(deadline, self.exits.recv_async()).await {
                Ok(Ok(exit)) => {
                    self.supervisor.record_exit(exit);
                }
                Ok(Err(_)) => break,
                Err(_) => {
                    debug!(outstanding = self.supervisor.outstanding(), "Drain grace elapsed");
                    break;
                }
            }
        }

        let forced = self.supervisor.force_retire_outstanding();
        if forced > 0 {
            warn!(forced, "Units did not stop in time and were retired forcibly");
        }
        forced
    }

    /// `Done` state.
    async fn finish(mut self, outcome: RunOutcome, force_retired: usize) -> RunSummary {
        self.supervisor.join_exited().await;

        if let Some(monitor) = self.monitor.take() {
            monitor.stop();
            match time::timeout(MONITOR_STOP_GRACE, monitor.join()).await {
                Ok(emitted) => debug!(emitted, "Monitor finished"),
                Err(_) => warn!("Monitor did not stop in time, leaving it behind"),
            }
        }

        let snapshot = StatusSnapshot::capture(&self.counters, self.start.elapsed());
        let report = Report::final_report(snapshot);
        for destination in &self.destinations {
            if let Err(e) = self.sink.emit(&report, *destination) {
                warn!(error = %e, destination = ?destination, "Failed to emit final report");
            }
        }

        info!(
            outcome = ?outcome,
            generated = snapshot.generated,
            found = snapshot.found,
            elapsed_secs = snapshot.elapsed_secs,
            "Run finished"
        );

        RunSummary {
            outcome,
            snapshot,
            units: self.supervisor.outcomes(),
            force_retired,
        }
    }

    fn transition(&mut self, next: ShutdownState) {
        debug!(from = ?self.state, to = ?next, "Shutdown state change");
        self.state = next;
    }
}
