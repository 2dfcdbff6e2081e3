//! # Run Orchestration
//!
//! [`GenPool`] ties one run together: it sizes the counters, starts the units,
//! starts the monitor and hands everything to the shutdown controller.
//!
//! ```rust,ignore
//! let pool = GenPool::new(run_config, PoolConfig::default(), sink)?;
//! let summary = pool.run(PrefixSearch::new(pool.run_config())?, interrupt).await?;
//! ```

use std::future::Future;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use genpool_api::{CounterSet, Gate, PoolError, ReportSink, RunConfig, WorkerEntry};

use crate::pool::{Monitor, PoolConfig, RunSummary, ShutdownController, Supervisor};
use crate::report::{final_destinations, status_destinations};

pub struct GenPool {
    run_config: Arc<RunConfig>,
    pool_config: PoolConfig,
    sink: Arc<dyn ReportSink>,
}

impl GenPool {
    /// Validate the configuration and prepare a run.
    pub fn new(
        run_config: RunConfig,
        pool_config: PoolConfig,
        sink: Arc<dyn ReportSink>,
    ) -> Result<Self, PoolError> {
        run_config.validate()?;
        Ok(Self {
            run_config: Arc::new(run_config),
            pool_config,
            sink,
        })
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.run_config
    }

    pub fn pool_config(&self) -> &PoolConfig {
        &self.pool_config
    }

    /// Run `entry` on every unit until all units have returned or `interrupt`
    /// completes, and return the summary carried by the final report.
    ///
    /// Fails only if the pool cannot be started; in that case no report is
    /// emitted.
    pub async fn run<E, I>(&self, entry: E, interrupt: I) -> Result<RunSummary, PoolError>
    where
        E: WorkerEntry,
        I: Future<Output = ()>,
    {
        let workers = self.run_config.workers;
        let counters = Arc::new(CounterSet::new(workers)?);
        let gate = Arc::new(Gate::new());
        let start = Instant::now();

        self.announce(&gate);

        let (supervisor, exits) = Supervisor::spawn(
            workers,
            Arc::new(entry),
            Arc::clone(&counters),
            Arc::clone(&gate),
            Arc::clone(&self.run_config),
            &self.pool_config,
        )?;

        let monitor = Monitor::new(
            start,
            Arc::clone(&counters),
            self.pool_config.update_interval,
            Arc::clone(&self.sink),
            status_destinations(&self.run_config),
        )
        .spawn();

        let controller = ShutdownController::new(
            supervisor,
            exits,
            counters,
            start,
            self.pool_config.drain_grace,
            Arc::clone(&self.sink),
            final_destinations(&self.run_config),
        )
        .with_monitor(monitor);

        Ok(controller.run(interrupt).await)
    }

    fn announce(&self, gate: &Gate) {
        info!(
            workers = self.run_config.workers,
            mode = self.run_config.mode_name(),
            "Starting workers"
        );
        let written = gate.with_lock(|| write_banner(&mut io::stdout().lock(), &self.run_config));
        if let Err(e) = written {
            debug!(error = %e, "Failed to print start banner");
        }
    }
}

/// Write the start banner line for `config` to `out`.
pub fn write_banner(out: &mut impl Write, config: &RunConfig) -> io::Result<()> {
    writeln!(
        out,
        "Starting {} workers in {} mode...",
        config.workers,
        config.mode_name()
    )?;
    out.flush()
}

impl std::fmt::Debug for GenPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenPool")
            .field("run_config", &self.run_config)
            .field("pool_config", &self.pool_config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_banner_names_workers_and_mode() {
        let mut out = Vec::new();
        let config = RunConfig::default().with_workers(3).with_fast_mode(true);
        write_banner(&mut out, &config).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Starting 3 workers in FAST mode...\n"
        );
    }

    #[test]
    fn test_banner_ignores_no_text() {
        let mut out = Vec::new();
        let config = RunConfig::default().with_workers(1).with_no_text(true);
        write_banner(&mut out, &config).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Starting 1 workers in STANDARD mode...\n"
        );
    }

    #[test]
    fn test_banner_write_error_reported() {
        let config = RunConfig::default().with_workers(1);
        let err = write_banner(&mut ClosedPipe, &config).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
