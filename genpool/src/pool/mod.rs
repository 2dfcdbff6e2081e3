//! # Pool Module
//!
//! Coordination of one run: a fixed set of worker units on dedicated threads,
//! a monitor task reporting their aggregate progress, and the shutdown controller
//! that waits for them and emits the final report.
//!
//! ## Key Concepts
//! - Units: one OS thread per unit, running the worker entry exactly once
//! - Supervisor: starts the units and owns their handles
//! - Monitor: periodic, read-only sampling of the shared counters
//! - Shutdown controller: `Running → Draining → Done`, final report exactly once

pub mod config;
pub mod monitor;
pub mod shutdown;
pub mod supervisor;
pub mod unit;

pub use config::PoolConfig;
pub use monitor::{Monitor, MonitorHandle};
pub use shutdown::{MONITOR_STOP_GRACE, RunOutcome, RunSummary, ShutdownController, ShutdownState};
pub use supervisor::Supervisor;
pub use unit::{UnitExit, UnitHandle, UnitOutcome, UnitState};
