use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use genpool::cli::Args;
use genpool::logging;
use genpool::report::{CompositeSink, ConsoleSink, LogSink, ReportFileSink};
use genpool::{GenPool, PrefixSearch, RunOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log_config()).context("failed to initialise logging")?;

    let run_config = args.run_config();
    let search = PrefixSearch::new(&run_config).context("failed to prepare search")?;

    let mut sink = CompositeSink::new()
        .with(LogSink)
        .with(ConsoleSink::stdout());
    if let Some(path) = &run_config.report_path {
        let file_sink = ReportFileSink::create(path, run_config.report_format, run_config.clone())
            .with_context(|| format!("failed to create report file {}", path.display()))?;
        sink.push(Box::new(file_sink));
    }

    let pool = GenPool::new(run_config, args.pool_config(), Arc::new(sink))?;
    let summary = pool.run(search, interrupt()).await?;

    if summary.outcome == RunOutcome::Interrupted {
        info!(force_retired = summary.force_retired, "Run interrupted by user");
    }
    Ok(())
}

/// Completes on Ctrl-C. If the handler cannot be installed the run is simply
/// never interrupted.
async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
