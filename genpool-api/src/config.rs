use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::PoolError;

/// Layout of the structured final report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// A single JSON document.
    #[default]
    Json,
    /// The human-readable final statistics line.
    Text,
}

/// Immutable description of one run, shared by every unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of worker units to spawn.
    pub workers: usize,

    /// Accelerated generation mode.
    pub fast_mode: bool,

    /// Suppress text output of individual matches.
    pub no_text: bool,

    /// Console mode flag, forwarded to the worker routine.
    pub console: bool,

    /// Keep periodic status reports off the interactive console.
    pub quiet_status: bool,

    /// Target fingerprint the worker routine matches candidates against.
    pub fingerprint: Option<String>,

    /// File that found results are appended to.
    pub found_path: Option<PathBuf>,

    /// File the structured final report is written to.
    pub report_path: Option<PathBuf>,

    /// Layout of the structured final report.
    pub report_format: ReportFormat,

    /// Candidates each unit generates before returning; `None` runs until stopped.
    pub limit: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            fast_mode: false,
            no_text: false,
            console: false,
            quiet_status: false,
            fingerprint: None,
            found_path: None,
            report_path: None,
            report_format: ReportFormat::Json,
            limit: None,
        }
    }
}

impl RunConfig {
    /// Set the number of worker units (at least one).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_fast_mode(mut self, enabled: bool) -> Self {
        self.fast_mode = enabled;
        self
    }

    pub fn with_no_text(mut self, enabled: bool) -> Self {
        self.no_text = enabled;
        self
    }

    pub fn with_console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    pub fn with_quiet_status(mut self, enabled: bool) -> Self {
        self.quiet_status = enabled;
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    pub fn with_found_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.found_path = Some(path.into());
        self
    }

    /// Write the structured final report to `path` using `format`.
    pub fn with_report(mut self, path: impl Into<PathBuf>, format: ReportFormat) -> Self {
        self.report_path = Some(path.into());
        self.report_format = format;
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the per-unit limit from an Option.
    pub fn with_limit_option(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    /// Human-readable name of the generation mode.
    pub fn mode_name(&self) -> &'static str {
        if self.fast_mode { "FAST" } else { "STANDARD" }
    }

    /// Check the configuration before any unit is spawned.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.workers == 0 {
            return Err(PoolError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        if let Some(fingerprint) = &self.fingerprint {
            if fingerprint.is_empty() {
                return Err(PoolError::InvalidConfig(
                    "fingerprint must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_workers() {
        let config = RunConfig::default().with_workers(0);
        assert_eq!(config.workers, 1);
    }

    #[test]
    fn test_mode_name() {
        assert_eq!(RunConfig::default().mode_name(), "STANDARD");
        assert_eq!(RunConfig::default().with_fast_mode(true).mode_name(), "FAST");
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = RunConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
