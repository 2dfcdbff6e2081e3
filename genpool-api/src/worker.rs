//! # Worker Entry Contract
//!
//! The generate-and-test routine a unit runs is opaque to the coordinator. It is
//! anything implementing [`WorkerEntry`], including plain closures taking a
//! [`UnitContext`].
//!
//! ## Contract
//!
//! - `run` is invoked exactly once per unit, on the unit's own thread.
//! - Every produced candidate is published with
//!   [`CounterSet::add_generated`](crate::CounterSet::add_generated), every match
//!   with [`CounterSet::add_found`](crate::CounterSet::add_found).
//! - Shared resources other than the counters are touched only under the
//!   [`Gate`](crate::Gate).
//! - The routine returns when its work is exhausted or when
//!   [`UnitContext::should_stop`] turns true. It never terminates the process.
//! - The routine does not touch `active_workers`; the coordinator retires the unit
//!   when `run` returns or panics.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::RunConfig;
use crate::counters::CounterSet;
use crate::gate::Gate;

/// The routine executed by each worker unit.
pub trait WorkerEntry: Send + Sync + 'static {
    fn run(&self, ctx: &UnitContext);
}

impl<F> WorkerEntry for F
where
    F: Fn(&UnitContext) + Send + Sync + 'static,
{
    fn run(&self, ctx: &UnitContext) {
        self(ctx)
    }
}

/// Cooperative stop request shared between a unit and its supervisor.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    requested: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the unit to return as soon as it next checks.
    pub fn request_stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Everything a unit's routine may touch.
#[derive(Clone)]
pub struct UnitContext {
    unit_id: usize,
    counters: Arc<CounterSet>,
    gate: Arc<Gate>,
    config: Arc<RunConfig>,
    stop: StopToken,
}

impl UnitContext {
    pub fn new(
        unit_id: usize,
        counters: Arc<CounterSet>,
        gate: Arc<Gate>,
        config: Arc<RunConfig>,
        stop: StopToken,
    ) -> Self {
        Self {
            unit_id,
            counters,
            gate,
            config,
            stop,
        }
    }

    /// Index of this unit within the pool, for seeding and logging only.
    pub fn unit_id(&self) -> usize {
        self.unit_id
    }

    pub fn counters(&self) -> &CounterSet {
        &self.counters
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Whether the coordinator has asked this unit to stop.
    pub fn should_stop(&self) -> bool {
        self.stop.is_stop_requested()
    }
}

impl fmt::Debug for UnitContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitContext")
            .field("unit_id", &self.unit_id)
            .field("should_stop", &self.should_stop())
            .finish()
    }
}
