use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::counters::CounterSet;

/// Candidates per second, or `0.0` when no time has elapsed.
pub fn throughput(generated: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs > 0.0 {
        generated as f64 / elapsed_secs
    } else {
        0.0
    }
}

/// Point-in-time view of a run's counters.
///
/// The three counters are read one after another, so a snapshot is a best-effort
/// sample rather than a consistent triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub elapsed_secs: f64,
    pub generated: u64,
    pub found: u64,
    pub throughput: f64,
    pub active_workers: usize,
}

impl StatusSnapshot {
    /// Sample `counters` with the given elapsed run time.
    pub fn capture(counters: &CounterSet, elapsed: Duration) -> Self {
        let active_workers = counters.active_workers();
        let generated = counters.generated();
        let found = counters.found();
        Self::from_parts(elapsed.as_secs_f64(), generated, found, active_workers)
    }

    pub fn from_parts(elapsed_secs: f64, generated: u64, found: u64, active_workers: usize) -> Self {
        Self {
            elapsed_secs,
            generated,
            found,
            throughput: throughput(generated, elapsed_secs),
            active_workers,
        }
    }

    /// The final statistics line printed when a run ends.
    pub fn final_line(&self) -> String {
        format!(
            "Final: Gen: {} | Found: {} | Time: {:.2}s",
            self.generated, self.found, self.elapsed_secs
        )
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Gen: {} | Found: {} | Speed: {:.2} cand/s | Workers: {}",
            self.generated, self.found, self.throughput, self.active_workers
        )
    }
}
