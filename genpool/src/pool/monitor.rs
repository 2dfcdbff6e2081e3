//! # Monitor
//!
//! Background task that samples the counters at a fixed cadence and emits a
//! status report for each sample.
//!
//! The loop ends on the first sample showing no active units (that sample is not
//! reported; the final report covers it) or when its stop signal fires. The
//! monitor never mutates the counters and never keeps a run alive: the shutdown
//! controller stops it and waits only a bounded time for it before the final
//! report.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use genpool_api::{CounterSet, Destination, Report, ReportSink, StatusSnapshot};

/// Handle to a running monitor task.
#[derive(Debug)]
pub struct MonitorHandle {
    stop: Arc<Notify>,
    task: JoinHandle<usize>,
}

impl MonitorHandle {
    /// Ask the monitor to end; it does so at its next suspension point.
    pub fn stop(&self) {
        self.stop.notify_one();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the monitor to end and return the number of reports it emitted.
    pub async fn join(self) -> usize {
        self.task.await.unwrap_or(0)
    }
}

#[derive(Debug)]
pub struct Monitor {
    start: Instant,
    counters: Arc<CounterSet>,
    interval: Duration,
    sink: Arc<dyn ReportSink>,
    destinations: Vec<Destination>,
}

impl Monitor {
    pub fn new(
        start: Instant,
        counters: Arc<CounterSet>,
        interval: Duration,
        sink: Arc<dyn ReportSink>,
        destinations: Vec<Destination>,
    ) -> Self {
        Self {
            start,
            counters,
            interval,
            sink,
            destinations,
        }
    }

    /// Start the monitor on the current tokio runtime.
    pub fn spawn(self) -> MonitorHandle {
        let stop = Arc::new(Notify::new());
        let task = tokio::spawn(self.run(Arc::clone(&stop)));
        MonitorHandle { stop, task }
    }

    /// Monitor loop; returns the number of status reports emitted.
    pub async fn run(self, stop: Arc<Notify>) -> usize {
        let first_tick = time::Instant::now() + self.interval;
        let mut ticker = time::interval_at(first_tick, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut emitted = 0;
        loop {
            tokio::select! {
                _ = stop.notified() => {
                    debug!(emitted, "Monitor stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let snapshot = StatusSnapshot::capture(&self.counters, self.start.elapsed());
                    if snapshot.active_workers == 0 {
                        debug!(emitted, "No active units left, monitor finished");
                        break;
                    }

                    let report = Report::status(snapshot);
                    for destination in &self.destinations {
                        if let Err(e) = self.sink.emit(&report, *destination) {
                            warn!(error = %e, destination = ?destination, "Failed to emit status report");
                        }
                    }
                    emitted += 1;
                }
            }
        }
        emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genpool_api::SinkError;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct CountingSink {
        reports: Mutex<Vec<Report>>,
    }

    impl ReportSink for CountingSink {
        fn emit(&self, report: &Report, _destination: Destination) -> Result<(), SinkError> {
            self.reports.lock().unwrap().push(*report);
            Ok(())
        }
    }

    #[derive(Debug)]
    struct FailingSink;

    impl ReportSink for FailingSink {
        fn emit(&self, _report: &Report, _destination: Destination) -> Result<(), SinkError> {
            Err(SinkError::Closed)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_reports_each_interval() {
        let counters = Arc::new(CounterSet::new(1).unwrap());
        let sink = Arc::new(CountingSink::default());
        let monitor = Monitor::new(
            Instant::now(),
            counters.clone(),
            Duration::from_secs(20),
            sink.clone(),
            vec![Destination::Log],
        );
        let handle = monitor.spawn();

        counters.add_generated(100);
        time::sleep(Duration::from_secs(61)).await;
        assert_eq!(sink.reports.lock().unwrap().len(), 3);

        counters.decrement_active_workers();
        let emitted = handle.join().await;
        assert_eq!(emitted, 3);
        assert!(sink.reports.lock().unwrap().iter().all(|r| r.snapshot.active_workers == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_stop_signal() {
        let counters = Arc::new(CounterSet::new(1).unwrap());
        let sink = Arc::new(CountingSink::default());
        let handle = Monitor::new(
            Instant::now(),
            counters,
            Duration::from_secs(20),
            sink.clone(),
            vec![Destination::Console],
        )
        .spawn();

        handle.stop();
        assert_eq!(handle.join().await, 0);
        assert!(sink.reports.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_survives_sink_failure() {
        let counters = Arc::new(CounterSet::new(1).unwrap());
        let handle = Monitor::new(
            Instant::now(),
            counters.clone(),
            Duration::from_secs(1),
            Arc::new(FailingSink),
            vec![Destination::Log],
        )
        .spawn();

        time::sleep(Duration::from_millis(3500)).await;
        counters.decrement_active_workers();
        assert_eq!(handle.join().await, 3);
    }
}
