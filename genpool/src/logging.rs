// Logging for genpool
//
// Built on the `tracing` ecosystem. Diagnostics go to stderr; with a log file
// configured, every event (including the periodic status reports routed to the
// persistent log) is also appended to that file.
//
// # Usage
//
// ```rust,ignore
// use genpool::logging::{self, LogConfig};
//
// logging::init(LogConfig::default().with_log_file("log.log"))?;
//
// tracing::info!("Run started");
// let span = genpool::unit_span!(3);
// let _guard = span.enter();
// ```

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use tracing::{Level, Subscriber};
use tracing_subscriber::{EnvFilter, Layer, filter::filter_fn, fmt, prelude::*};

use genpool_api::PoolError;

/// Target of the events that carry status and final reports.
pub const REPORT_TARGET: &str = "genpool::report";

/// Default persistent log file.
pub const DEFAULT_LOG_FILE: &str = "log.log";

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to record
    pub level: Level,
    /// Whether stderr output uses JSON
    pub json_format: bool,
    /// Whether to include file and line information
    pub show_file_line: bool,
    /// Whether to include thread name/id
    pub show_thread_info: bool,
    /// Target filter expressions (format: "target=level,target2=level2,...")
    pub target_filters: Option<String>,
    /// Persistent log file, appended to
    pub log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_file_line: false,
            show_thread_info: true,
            target_filters: None,
            log_file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }
}

impl LogConfig {
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn without_log_file(mut self) -> Self {
        self.log_file = None;
        self
    }
}

// Initialization guard to ensure we only initialize once
static INIT: Once = Once::new();

/// Initialize the global subscriber.
///
/// The log file is opened before anything is installed so an unwritable
/// destination is reported as a startup failure. Only the first call installs a
/// subscriber; later calls are no-ops.
pub fn init(config: LogConfig) -> Result<(), PoolError> {
    let file = match &config.log_file {
        Some(path) => Some(open_log_file(path)?),
        None => None,
    };

    INIT.call_once(move || {
        let mut env_filter = EnvFilter::from_default_env().add_directive(config.level.into());

        if let Some(filters) = &config.target_filters {
            for filter in filters.split(',') {
                if let Ok(directive) = filter.parse() {
                    env_filter = env_filter.add_directive(directive);
                }
            }
        }

        // Reports have their own console rendering; keep them out of stderr.
        let console_layer = if config.json_format {
            fmt::layer()
                .json()
                .flatten_event(true)
                .with_writer(io::stderr)
                .boxed()
        } else {
            fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(atty::is(atty::Stream::Stderr))
                .with_file(config.show_file_line)
                .with_line_number(config.show_file_line)
                .with_thread_names(config.show_thread_info)
                .with_thread_ids(config.show_thread_info)
                .boxed()
        }
        .with_filter(filter_fn(|meta| meta.target() != REPORT_TARGET));

        let file_layer = file.map(|file| {
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_thread_names(true)
        });

        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer);

        set_global_subscriber(subscriber);
    });

    Ok(())
}

/// Initialize logging for tests: warnings and errors only, no log file.
pub fn init_test() {
    let config = LogConfig {
        level: Level::WARN,
        show_file_line: true,
        show_thread_info: false,
        log_file: None,
        ..Default::default()
    };
    // Without a log file there is nothing that can fail.
    let _ = init(config);
}

fn set_global_subscriber<S>(subscriber: S)
where
    S: Subscriber + Send + Sync + 'static,
{
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error setting global tracing subscriber: {}", err);
    }
}

/// Open `path` for appending, creating it if needed.
pub fn open_log_file(path: &Path) -> Result<File, PoolError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| PoolError::Logging(format!("cannot open log file {}: {}", path.display(), e)))
}

/// Span covering everything a worker unit does on its thread.
///
/// ```rust,ignore
/// let span = genpool::unit_span!(unit_id);
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! unit_span {
    ($unit_id:expr) => {
        tracing::info_span!("unit", unit_id = $unit_id)
    };
    ($unit_id:expr, $($fields:tt)*) => {
        tracing::info_span!("unit", unit_id = $unit_id, $($fields)*)
    };
}
