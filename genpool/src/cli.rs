//! Command line interface of the `genpool` binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::Level;

use genpool_api::{ReportFormat, RunConfig};

use crate::logging::{DEFAULT_LOG_FILE, LogConfig};
use crate::pool::PoolConfig;

#[derive(Parser, Debug)]
#[command(name = "genpool")]
#[command(about = "genpool - parallel candidate generation and matching")]
#[command(version)]
pub struct Args {
    /// Number of worker threads (defaults to the number of CPUs)
    #[arg(short = 't', long = "threads")]
    pub threads: Option<usize>,

    /// Generate candidates in batches
    #[arg(long = "fastmode", visible_alias = "fm")]
    pub fast_mode: bool,

    /// Do not print individual matches
    #[arg(long = "no-text", visible_alias = "nt")]
    pub no_text: bool,

    /// Console mode, passed to the worker
    #[arg(short = 'c', long = "console")]
    pub console: bool,

    /// Keep periodic status lines off the console
    #[arg(short = 'q', long = "quiet-status")]
    pub quiet_status: bool,

    /// Hex prefix candidates are matched against
    #[arg(long = "fp", value_name = "PREFIX")]
    pub fingerprint: Option<String>,

    /// File matches are appended to
    #[arg(long = "fs", value_name = "PATH")]
    pub found_path: Option<PathBuf>,

    /// Write the final report to this file
    #[arg(short = 'j', long = "json", value_name = "PATH")]
    pub report_path: Option<PathBuf>,

    /// Layout of the final report file
    #[arg(long, value_enum, default_value = "json")]
    pub report_format: CliReportFormat,

    /// Candidates each worker generates before returning
    #[arg(long)]
    pub limit: Option<u64>,

    /// Seconds between status reports
    #[arg(long, default_value_t = 20)]
    pub interval: u64,

    /// Persistent log file
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// CLI report format selection
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliReportFormat {
    /// A single JSON document
    Json,
    /// The final statistics line
    Text,
}

impl From<CliReportFormat> for ReportFormat {
    fn from(cli: CliReportFormat) -> Self {
        match cli {
            CliReportFormat::Json => ReportFormat::Json,
            CliReportFormat::Text => ReportFormat::Text,
        }
    }
}

impl Args {
    pub fn run_config(&self) -> RunConfig {
        let mut config = RunConfig::default()
            .with_fast_mode(self.fast_mode)
            .with_no_text(self.no_text)
            .with_console(self.console)
            .with_quiet_status(self.quiet_status)
            .with_limit_option(self.limit);

        if let Some(threads) = self.threads {
            config = config.with_workers(threads);
        }
        if let Some(fingerprint) = &self.fingerprint {
            config = config.with_fingerprint(fingerprint.clone());
        }
        if let Some(path) = &self.found_path {
            config = config.with_found_path(path.clone());
        }
        if let Some(path) = &self.report_path {
            config = config.with_report(path.clone(), self.report_format.into());
        }
        config
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::default().with_update_interval(Duration::from_secs(self.interval))
    }

    pub fn log_config(&self) -> LogConfig {
        let level = match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        LogConfig::default()
            .with_level(level)
            .with_log_file(self.log_file.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["genpool"]).unwrap();
        let config = args.run_config();
        assert_eq!(config.workers, num_cpus::get());
        assert!(!config.fast_mode);
        assert!(config.report_path.is_none());
        assert!(!config.quiet_status);
        assert_eq!(args.pool_config().update_interval, Duration::from_secs(20));
        assert_eq!(args.log_config().log_file, Some(PathBuf::from("log.log")));
    }

    #[test]
    fn test_short_aliases() {
        let args = Args::try_parse_from([
            "genpool", "-t", "4", "--fm", "--nt", "-c", "--fp", "abc", "--fs", "found.txt",
        ])
        .unwrap();
        let config = args.run_config();
        assert_eq!(config.workers, 4);
        assert!(config.fast_mode);
        assert!(config.no_text);
        assert!(config.console);
        assert_eq!(config.fingerprint.as_deref(), Some("abc"));
        assert_eq!(config.found_path, Some(PathBuf::from("found.txt")));
    }

    #[test]
    fn test_report_file_and_format() {
        let args =
            Args::try_parse_from(["genpool", "-j", "out.txt", "--report-format", "text"]).unwrap();
        let config = args.run_config();
        assert_eq!(config.report_path, Some(PathBuf::from("out.txt")));
        assert_eq!(config.report_format, ReportFormat::Text);
    }

    #[test]
    fn test_quiet_status_flag() {
        let args = Args::try_parse_from(["genpool", "-q"]).unwrap();
        assert!(args.run_config().quiet_status);
    }

    #[test]
    fn test_zero_threads_clamped() {
        let args = Args::try_parse_from(["genpool", "--threads", "0"]).unwrap();
        assert_eq!(args.run_config().workers, 1);
    }

    #[test]
    fn test_verbosity() {
        let args = Args::try_parse_from(["genpool", "-vv"]).unwrap();
        assert_eq!(args.log_config().level, Level::TRACE);
    }
}
