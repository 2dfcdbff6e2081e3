//! # Worker Unit Supervisor
//!
//! Starts the fixed pool of units and owns their handles for the rest of the run.
//!
//! ## Key Concepts
//! - Fixed size: exactly `n` units are started, none is ever respawned
//! - Symmetry: every unit runs the same entry with the same configuration
//! - Fail fast: if any unit cannot be started, the ones already running are
//!   stopped and retired and the spawn reports a fatal error

use std::sync::Arc;

use flume::{Receiver, Sender};
use tracing::{debug, error, info};

use genpool_api::{CounterSet, Gate, PoolError, RunConfig, WorkerEntry};

use super::config::PoolConfig;
use super::unit::{UnitExit, UnitHandle, UnitOutcome, UnitSpec};

/// Owner of all unit handles of one run.
#[derive(Debug)]
pub struct Supervisor {
    units: Vec<UnitHandle>,
    counters: Arc<CounterSet>,
}

impl Supervisor {
    /// Start `n` units, each running `entry` once.
    ///
    /// Returns as soon as every thread has been started, together with the
    /// receiving end of the exit notifications.
    pub fn spawn(
        n: usize,
        entry: Arc<dyn WorkerEntry>,
        counters: Arc<CounterSet>,
        gate: Arc<Gate>,
        config: Arc<RunConfig>,
        pool_config: &PoolConfig,
    ) -> Result<(Self, Receiver<UnitExit>), PoolError> {
        if n == 0 {
            return Err(PoolError::InvalidConfig(
                "cannot spawn an empty pool".to_string(),
            ));
        }
        if counters.initial_workers() != n {
            return Err(PoolError::InvalidConfig(format!(
                "counter set sized for {} workers, asked to spawn {}",
                counters.initial_workers(),
                n
            )));
        }

        let (exit_tx, exit_rx): (Sender<UnitExit>, Receiver<UnitExit>) = flume::unbounded();
        let mut supervisor = Self {
            units: Vec::with_capacity(n),
            counters: Arc::clone(&counters),
        };

        for id in 0..n {
            let spec = UnitSpec {
                id,
                thread_name: format!("{}{}", pool_config.thread_name_prefix, id),
                entry: Arc::clone(&entry),
                counters: Arc::clone(&counters),
                gate: Arc::clone(&gate),
                config: Arc::clone(&config),
                exit_tx: exit_tx.clone(),
            };

            match UnitHandle::start(spec) {
                Ok(handle) => supervisor.units.push(handle),
                Err(e) => {
                    error!(unit_id = id, error = %e, "Failed to spawn unit, aborting startup");
                    supervisor.abort_startup(n - id);
                    return Err(PoolError::Spawn {
                        unit_id: id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(units = n, "Worker units started");
        Ok((supervisor, exit_rx))
    }

    /// Stop and retire everything started so far, and account for the
    /// `never_started` units that will not retire themselves.
    fn abort_startup(&mut self, never_started: usize) {
        for unit in &mut self.units {
            unit.force_retire(&self.counters);
        }
        for _ in 0..never_started {
            self.counters.decrement_active_workers();
        }
    }

    /// Number of units started.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[UnitHandle] {
        &self.units
    }

    /// Units that have neither exited nor been detached.
    pub fn outstanding(&self) -> usize {
        self.units.iter().filter(|u| u.is_outstanding()).count()
    }

    /// Record an exit notification. Returns `false` for unknown or duplicate exits.
    pub fn record_exit(&mut self, exit: UnitExit) -> bool {
        match self.units.get_mut(exit.unit_id) {
            Some(unit) if unit.is_outstanding() => {
                match &exit.outcome {
                    UnitOutcome::Panicked(message) => {
                        error!(unit_id = exit.unit_id, panic = %message, "Unit exited abnormally, not respawning")
                    }
                    outcome => debug!(unit_id = exit.unit_id, outcome = ?outcome, "Unit exited"),
                }
                unit.mark_exited(exit.outcome);
                true
            }
            _ => false,
        }
    }

    /// Ask every outstanding unit to stop; does not wait.
    pub fn request_stop_all(&mut self) {
        for unit in &mut self.units {
            unit.request_stop();
        }
    }

    /// Retire every outstanding unit without waiting for it. Returns how many
    /// `active_workers` decrements this performed.
    pub fn force_retire_outstanding(&mut self) -> usize {
        let counters = Arc::clone(&self.counters);
        self.units
            .iter_mut()
            .filter(|u| u.is_outstanding())
            .map(|u| u.force_retire(&counters))
            .filter(|decremented| *decremented)
            .count()
    }

    /// Join the threads of all exited units.
    pub async fn join_exited(&mut self) {
        for unit in &mut self.units {
            unit.join().await;
        }
    }

    /// Per-unit outcomes, in unit order.
    pub fn outcomes(&self) -> Vec<Option<UnitOutcome>> {
        self.units.iter().map(|u| u.outcome().cloned()).collect()
    }
}
