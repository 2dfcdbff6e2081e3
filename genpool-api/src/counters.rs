//! # Shared Counter Set
//!
//! The three counters every unit, the monitor and the shutdown controller share.
//! All operations are single atomic instructions, so no update is ever lost and
//! no caller blocks.
//!
//! Reads of different counters are independent: a caller reading `generated`,
//! `found` and `active_workers` in turn observes three slightly different
//! instants, never an atomic triple.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::errors::PoolError;

/// Names a monotonically increasing counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// Candidates produced by all units.
    Generated,
    /// Matches recorded by all units.
    Found,
}

/// Process-wide progress counters for one run.
pub struct CounterSet {
    generated: AtomicU64,
    found: AtomicU64,
    active_workers: AtomicUsize,
    initial_workers: usize,
}

impl CounterSet {
    /// Create a counter set for a pool of `workers` units.
    ///
    /// `active_workers` starts at `workers`; the other counters start at zero.
    /// A pool of zero units is a configuration error.
    pub fn new(workers: usize) -> Result<Self, PoolError> {
        if workers == 0 {
            return Err(PoolError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            generated: AtomicU64::new(0),
            found: AtomicU64::new(0),
            active_workers: AtomicUsize::new(workers),
            initial_workers: workers,
        })
    }

    /// Atomically add `delta` to `counter` and return the new value.
    ///
    /// Saturates at `u64::MAX` instead of wrapping; readers never observe a
    /// smaller value than an earlier one.
    pub fn increment(&self, counter: Counter, delta: u64) -> u64 {
        let previous = self
            .cell(counter)
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                Some(v.saturating_add(delta))
            })
            .unwrap_or_else(|v| v);
        previous.saturating_add(delta)
    }

    /// Record `n` generated candidates.
    #[inline]
    pub fn add_generated(&self, n: u64) {
        self.increment(Counter::Generated, n);
    }

    /// Record `n` matches.
    #[inline]
    pub fn add_found(&self, n: u64) {
        self.increment(Counter::Found, n);
    }

    /// Point-in-time read of `counter`.
    pub fn read(&self, counter: Counter) -> u64 {
        self.cell(counter).load(Ordering::Acquire)
    }

    pub fn generated(&self) -> u64 {
        self.read(Counter::Generated)
    }

    pub fn found(&self) -> u64 {
        self.read(Counter::Found)
    }

    /// Number of units that have not retired yet.
    pub fn active_workers(&self) -> usize {
        self.active_workers.load(Ordering::Acquire)
    }

    /// The pool size this set was created for.
    pub fn initial_workers(&self) -> usize {
        self.initial_workers
    }

    /// Atomically retire one unit.
    ///
    /// Returns the remaining number of active units, or `None` if the count was
    /// already zero (the count never goes negative).
    pub fn decrement_active_workers(&self) -> Option<usize> {
        self.active_workers
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |active| {
                active.checked_sub(1)
            })
            .ok()
            .map(|previous| previous - 1)
    }

    fn cell(&self, counter: Counter) -> &AtomicU64 {
        match counter {
            Counter::Generated => &self.generated,
            Counter::Found => &self.found,
        }
    }
}

impl fmt::Debug for CounterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CounterSet")
            .field("generated", &self.generated())
            .field("found", &self.found())
            .field("active_workers", &self.active_workers())
            .field("initial_workers", &self.initial_workers)
            .finish()
    }
}
