//! # genpool API
//!
//! Contract types shared by the genpool coordinator and the worker routines it runs.
//!
//! A run is a fixed pool of worker units, each executing the same long,
//! CPU-bound generate-and-test routine. Units publish their progress through a
//! [`CounterSet`], serialise access to shared external resources through a
//! [`Gate`], and read the immutable [`RunConfig`]. The coordinator samples the
//! counters into [`StatusSnapshot`] values and hands them to a [`ReportSink`].
//!
//! ## Core Components
//!
//! - **Counters**: lock-free `generated`, `found` and `active_workers` counters
//! - **Gate**: the single mutual-exclusion capability handed to units
//! - **Run configuration**: worker count, mode flags and optional paths
//! - **Snapshots and reports**: derived point-in-time views and the sink contract
//! - **Worker entry**: the pluggable routine invoked once per unit
//!
//! ## Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//! use genpool_api::{CounterSet, Gate, RunConfig, StopToken, UnitContext, WorkerEntry};
//!
//! let entry = |ctx: &UnitContext| {
//!     for _ in 0..100 {
//!         ctx.counters().add_generated(1);
//!     }
//! };
//!
//! let counters = Arc::new(CounterSet::new(1).unwrap());
//! let ctx = UnitContext::new(
//!     0,
//!     counters.clone(),
//!     Arc::new(Gate::new()),
//!     Arc::new(RunConfig::default().with_workers(1)),
//!     StopToken::new(),
//! );
//! entry.run(&ctx);
//! assert_eq!(counters.generated(), 100);
//! ```
//!
//! ## Module Organization
//!
//! - [`counters`]: shared atomic counters
//! - [`gate`]: mutual-exclusion gate
//! - [`config`]: run configuration
//! - [`snapshot`]: status snapshots and throughput
//! - [`report`]: report values, destinations and the sink trait
//! - [`worker`]: worker entry contract and unit context
//! - [`errors`]: error types

pub mod config;
pub mod counters;
pub mod errors;
pub mod gate;
pub mod report;
pub mod snapshot;
pub mod worker;

pub use config::{ReportFormat, RunConfig};
pub use counters::{Counter, CounterSet};
pub use errors::{PoolError, SinkError};
pub use gate::Gate;
pub use report::{Destination, Report, ReportKind, ReportSink};
pub use snapshot::{StatusSnapshot, throughput};
pub use worker::{StopToken, UnitContext, WorkerEntry};
