// genpool runtime
//
// Runs a fixed pool of worker units on dedicated threads, reports their
// aggregate progress periodically and emits exactly one final report when the
// run ends, whether the units finish on their own or the run is interrupted.

pub mod cli;
pub mod logging;
pub mod pool;
pub mod report;
pub mod search;
pub mod system;

// Re-export commonly used types
pub use genpool_api::*;
pub use pool::{PoolConfig, RunOutcome, RunSummary};
pub use search::PrefixSearch;
pub use system::GenPool;
