// Integration tests for genpool_api::gate

use std::panic;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use genpool_api::gate::Gate;

#[test]
fn test_with_lock_returns_value() {
    let gate = Gate::new();
    let value = gate.with_lock(|| 42);
    assert_eq!(value, 42);
}

#[test]
fn test_critical_sections_never_interleave() {
    let gate = Arc::new(Gate::new());
    let inside = Arc::new(AtomicUsize::new(0));
    let max_inside = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let gate = Arc::clone(&gate);
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            thread::spawn(move || {
                for _ in 0..200 {
                    gate.with_lock(|| {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        thread::yield_now();
                        inside.fetch_sub(1, Ordering::SeqCst);
                    });
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(max_inside.load(Ordering::SeqCst), 1);
}

#[test]
fn test_try_lock_while_held() {
    let gate = Gate::new();
    let guard = gate.lock();
    assert!(gate.try_lock().is_none());
    drop(guard);
    assert!(gate.try_lock().is_some());
}

#[test]
fn test_gate_released_after_panic_inside() {
    let gate = Arc::new(Gate::new());

    let panicking = {
        let gate = Arc::clone(&gate);
        thread::spawn(move || {
            gate.with_lock(|| panic!("unit failed while holding the gate"));
        })
    };
    assert!(panicking.join().is_err());

    assert!(gate.was_poisoned());

    // A later holder must still get in
    let (tx, rx) = std::sync::mpsc::channel();
    let gate2 = Arc::clone(&gate);
    thread::spawn(move || {
        gate2.with_lock(|| tx.send(()).unwrap());
    });
    rx.recv_timeout(Duration::from_secs(5))
        .expect("gate stayed held after a panic");
}

#[test]
fn test_with_lock_unwinds_cleanly() {
    let gate = Gate::new();
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        gate.with_lock(|| panic!("boom"));
    }));
    assert!(result.is_err());
    assert!(gate.try_lock().is_some());
}
