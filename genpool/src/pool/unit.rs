//! # Worker Unit Module
//!
//! A unit is one OS thread running the worker entry exactly once. This module
//! owns the thread's lifecycle: spawning, panic capture, retirement from the
//! active-worker count and the exit notification sent to the shutdown controller.
//!
//! ## Retirement
//! Every unit decrements `active_workers` exactly once. Normally the unit thread
//! does this itself after its entry returns or panics. When the controller gives
//! up on a unit after an interrupt it retires the unit on its behalf. Both paths go
//! through [`UnitSlot::retire`], whose flag makes the second caller a no-op.

use std::any::Any;
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use flume::Sender;
use tracing::{debug, error, warn};

use genpool_api::{CounterSet, Gate, RunConfig, StopToken, UnitContext, WorkerEntry};

use crate::unit_span;

/// Lifecycle of a unit as seen from its handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    /// The thread is executing the entry.
    Running,
    /// A stop was requested and the thread has not exited yet.
    Stopping,
    /// The thread reported its exit.
    Exited,
    /// The controller retired the unit and let go of the thread.
    Detached,
}

/// How a unit ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// The entry returned on its own.
    Completed,
    /// The entry returned after a stop request.
    Stopped,
    /// The entry panicked; carries the panic message.
    Panicked(String),
    /// The unit did not exit within the drain grace and was retired forcibly.
    ForceRetired,
}

impl UnitOutcome {
    pub fn is_abnormal(&self) -> bool {
        matches!(self, UnitOutcome::Panicked(_) | UnitOutcome::ForceRetired)
    }
}

/// Exit notification posted by a unit thread as its last action.
#[derive(Debug, Clone)]
pub struct UnitExit {
    pub unit_id: usize,
    pub outcome: UnitOutcome,
}

/// State shared between a unit thread and its handle.
#[derive(Debug, Default)]
pub(crate) struct UnitSlot {
    stop: StopToken,
    retired: AtomicBool,
}

impl UnitSlot {
    /// Decrement `active_workers` for this unit unless that already happened.
    pub(crate) fn retire(&self, counters: &CounterSet) -> bool {
        if self.retired.swap(true, Ordering::SeqCst) {
            return false;
        }
        counters.decrement_active_workers();
        true
    }

    pub(crate) fn is_retired(&self) -> bool {
        self.retired.load(Ordering::SeqCst)
    }
}

/// Everything a unit thread needs, moved into the thread on spawn.
pub(crate) struct UnitSpec {
    pub id: usize,
    pub thread_name: String,
    pub entry: Arc<dyn WorkerEntry>,
    pub counters: Arc<CounterSet>,
    pub gate: Arc<Gate>,
    pub config: Arc<RunConfig>,
    pub exit_tx: Sender<UnitExit>,
}

/// Lifecycle handle of one unit, owned by the supervisor.
pub struct UnitHandle {
    id: usize,
    state: UnitState,
    slot: Arc<UnitSlot>,
    thread: Option<JoinHandle<()>>,
    outcome: Option<UnitOutcome>,
}

impl fmt::Debug for UnitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitHandle")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("retired", &self.slot.is_retired())
            .field("has_thread", &self.thread.is_some())
            .finish()
    }
}

impl UnitHandle {
    /// Start the unit thread.
    pub(crate) fn start(spec: UnitSpec) -> io::Result<Self> {
        let id = spec.id;
        let slot = Arc::new(UnitSlot::default());
        let thread_slot = Arc::clone(&slot);

        let thread = std::thread::Builder::new()
            .name(spec.thread_name.clone())
            .spawn(move || unit_thread_main(spec, thread_slot))?;

        Ok(Self {
            id,
            state: UnitState::Running,
            slot,
            thread: Some(thread),
            outcome: None,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    pub fn outcome(&self) -> Option<&UnitOutcome> {
        self.outcome.as_ref()
    }

    /// Whether the unit has neither exited nor been detached.
    pub fn is_outstanding(&self) -> bool {
        matches!(self.state, UnitState::Running | UnitState::Stopping)
    }

    /// Ask the unit's entry to return; does not wait.
    pub fn request_stop(&mut self) {
        if self.state == UnitState::Running {
            self.slot.stop.request_stop();
            self.state = UnitState::Stopping;
        }
    }

    pub(crate) fn mark_exited(&mut self, outcome: UnitOutcome) {
        if self.is_outstanding() {
            self.state = UnitState::Exited;
            self.outcome = Some(outcome);
        }
    }

    /// Retire the unit without waiting for its thread and drop the join handle.
    ///
    /// Returns `true` if this call decremented `active_workers`.
    pub(crate) fn force_retire(&mut self, counters: &CounterSet) -> bool {
        self.slot.stop.request_stop();
        let decremented = self.slot.retire(counters);
        // Dropping the JoinHandle detaches the thread; it ends with the process.
        self.thread.take();
        self.state = UnitState::Detached;
        self.outcome = Some(UnitOutcome::ForceRetired);
        decremented
    }

    /// Join an exited unit's thread.
    pub(crate) async fn join(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };

        let id = self.id;
        match tokio::task::spawn_blocking(move || thread.join()).await {
            Ok(Ok(())) => debug!(unit_id = id, "Unit thread joined"),
            Ok(Err(e)) => error!(unit_id = id, panic = %panic_message(e.as_ref()), "Unit thread panicked outside its entry"),
            Err(e) => warn!(unit_id = id, error = %e, "Failed to join unit thread"),
        }
    }
}

/// Main function of a unit thread.
fn unit_thread_main(spec: UnitSpec, slot: Arc<UnitSlot>) {
    let span = unit_span!(spec.id);
    let _guard = span.enter();

    let ctx = UnitContext::new(
        spec.id,
        Arc::clone(&spec.counters),
        spec.gate,
        spec.config,
        slot.stop.clone(),
    );

    debug!("Unit started");
    let result = panic::catch_unwind(AssertUnwindSafe(|| spec.entry.run(&ctx)));

    let outcome = match result {
        Ok(()) if slot.stop.is_stop_requested() => UnitOutcome::Stopped,
        Ok(()) => UnitOutcome::Completed,
        Err(e) => {
            let message = panic_message(e.as_ref());
            error!(panic = %message, "Unit entry panicked");
            UnitOutcome::Panicked(message)
        }
    };

    // Retire before notifying so the controller never sees an exit whose
    // decrement is still pending.
    slot.retire(&spec.counters);
    debug!(outcome = ?outcome, remaining = spec.counters.active_workers(), "Unit exited");

    let _ = spec.exit_tx.send(UnitExit {
        unit_id: spec.id,
        outcome,
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_retires_once() {
        let counters = CounterSet::new(2).unwrap();
        let slot = UnitSlot::default();

        assert!(slot.retire(&counters));
        assert!(!slot.retire(&counters));
        assert!(slot.is_retired());
        assert_eq!(counters.active_workers(), 1);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(payload.as_ref()), "owned message");

        let payload: Box<dyn Any + Send> = Box::new(7u32);
        assert_eq!(panic_message(payload.as_ref()), "Unknown panic");
    }

    #[test]
    fn test_outcome_abnormal() {
        assert!(UnitOutcome::Panicked("x".into()).is_abnormal());
        assert!(UnitOutcome::ForceRetired.is_abnormal());
        assert!(!UnitOutcome::Completed.is_abnormal());
        assert!(!UnitOutcome::Stopped.is_abnormal());
    }
}
