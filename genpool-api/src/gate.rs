//! # Mutual-Exclusion Gate
//!
//! A single lock shared by all units of a run, used around any non-atomic
//! operation on a resource outside the [`CounterSet`](crate::CounterSet), such as
//! appending a match to a shared results file.
//!
//! Acquisition is scoped: the lock is held by a guard that is released when the
//! critical section returns or unwinds. A unit that panics inside the gate poisons
//! the underlying mutex; the gate ignores poisoning, so the next holder proceeds
//! instead of being locked out for the rest of the run.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

/// Exclusive-access capability handed to worker units.
#[derive(Default)]
pub struct Gate {
    lock: Mutex<()>,
}

/// Proof of exclusive access; the gate is released on drop.
pub struct GateGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `critical_section` with exclusive access against every other holder
    /// of this gate.
    pub fn with_lock<R>(&self, critical_section: impl FnOnce() -> R) -> R {
        let _guard = self.lock();
        critical_section()
    }

    /// Acquire the gate, blocking until it is free.
    pub fn lock(&self) -> GateGuard<'_> {
        GateGuard {
            _guard: self.lock.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Acquire the gate only if no other unit holds it.
    pub fn try_lock(&self) -> Option<GateGuard<'_>> {
        match self.lock.try_lock() {
            Ok(guard) => Some(GateGuard { _guard: guard }),
            Err(TryLockError::Poisoned(poisoned)) => Some(GateGuard {
                _guard: poisoned.into_inner(),
            }),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Whether a unit panicked while holding the gate at some point.
    pub fn was_poisoned(&self) -> bool {
        self.lock.is_poisoned()
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("held", &self.lock.try_lock().is_err())
            .field("poisoned", &self.lock.is_poisoned())
            .finish()
    }
}
