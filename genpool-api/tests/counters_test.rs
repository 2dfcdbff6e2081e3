// Integration tests for genpool_api::counters

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use genpool_api::counters::{Counter, CounterSet};

#[test]
fn test_new_counter_set() {
    let counters = CounterSet::new(4).unwrap();
    assert_eq!(counters.generated(), 0);
    assert_eq!(counters.found(), 0);
    assert_eq!(counters.active_workers(), 4);
    assert_eq!(counters.initial_workers(), 4);
}

#[test]
fn test_concurrent_increments_are_not_lost() {
    const UNITS: usize = 8;
    const INCREMENTS: u64 = 10_000;

    let counters = Arc::new(CounterSet::new(UNITS).unwrap());

    let handles: Vec<_> = (0..UNITS)
        .map(|_| {
            let counters = Arc::clone(&counters);
            thread::spawn(move || {
                for i in 0..INCREMENTS {
                    counters.add_generated(1);
                    if i % 100 == 0 {
                        counters.add_found(1);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(counters.generated(), UNITS as u64 * INCREMENTS);
    assert_eq!(counters.found(), UNITS as u64 * (INCREMENTS / 100));
}

#[test]
fn test_active_workers_monotonic_and_bounded() {
    const UNITS: usize = 16;

    let counters = Arc::new(CounterSet::new(UNITS).unwrap());
    let done = Arc::new(AtomicBool::new(false));

    // Observer samples while units retire concurrently
    let observer = {
        let counters = Arc::clone(&counters);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut last = counters.active_workers();
            let mut samples = Vec::new();
            while !done.load(Ordering::SeqCst) {
                let current = counters.active_workers();
                assert!(current <= last, "active_workers increased: {} -> {}", last, current);
                assert!(current <= UNITS);
                last = current;
                samples.push(current);
            }
            samples
        })
    };

    let handles: Vec<_> = (0..UNITS)
        .map(|_| {
            let counters = Arc::clone(&counters);
            thread::spawn(move || counters.decrement_active_workers())
        })
        .collect();

    let mut remaining: Vec<usize> = handles
        .into_iter()
        .map(|h| h.join().unwrap().expect("each unit retires once"))
        .collect();
    remaining.sort_unstable();

    done.store(true, Ordering::SeqCst);
    observer.join().unwrap();

    // Every remaining count from 0 to UNITS-1 was observed by exactly one retiring unit
    assert_eq!(remaining, (0..UNITS).collect::<Vec<_>>());
    assert_eq!(counters.active_workers(), 0);

    // Extra decrements never go below zero
    assert_eq!(counters.decrement_active_workers(), None);
    assert_eq!(counters.active_workers(), 0);
}

#[test]
fn test_read_by_name() {
    let counters = CounterSet::new(1).unwrap();
    counters.increment(Counter::Generated, 1000);
    counters.increment(Counter::Found, 3);
    assert_eq!(counters.read(Counter::Generated), 1000);
    assert_eq!(counters.read(Counter::Found), 3);
}

#[test]
fn test_debug_format() {
    let counters = CounterSet::new(2).unwrap();
    counters.add_generated(5);
    let debug = format!("{:?}", counters);
    assert!(debug.contains("generated: 5"));
    assert!(debug.contains("active_workers: 2"));
}

#[test]
fn test_saturating_counter_never_observed_decreasing() {
    let counters = Arc::new(CounterSet::new(1).unwrap());
    counters.add_generated(u64::MAX - 1_000);
    let done = Arc::new(AtomicBool::new(false));

    let observer = {
        let counters = counters.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut last = 0;
            while !done.load(Ordering::SeqCst) {
                let value = counters.generated();
                assert!(value >= last, "generated went from {} to {}", last, value);
                last = value;
            }
        })
    };

    let writers: Vec<_> = (0..4)
        .map(|_| {
            let counters = counters.clone();
            thread::spawn(move || {
                for _ in 0..10_000 {
                    counters.add_generated(1);
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }
    done.store(true, Ordering::SeqCst);
    observer.join().unwrap();

    assert_eq!(counters.generated(), u64::MAX);
}
