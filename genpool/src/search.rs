//! Reference worker entry: random-candidate prefix search.
//!
//! Each candidate is a random 128-bit value (a v4 UUID) rendered as 32 lowercase
//! hex digits. A candidate matches when it starts with the configured
//! fingerprint prefix. Matches are counted, appended to the found-results file
//! and printed, with the file append and the print done under the gate so lines
//! from different units never interleave.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};

use owo_colors::OwoColorize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use genpool_api::{PoolError, RunConfig, UnitContext, WorkerEntry};

/// Prefix used when no fingerprint is configured.
pub const DEFAULT_PREFIX: &str = "00000";

/// Candidates generated per counter update in fast mode.
pub const FAST_BATCH: u64 = 1024;

#[derive(Debug)]
pub struct PrefixSearch {
    prefix: String,
    found_file: Option<File>,
    ansi: bool,
}

impl PrefixSearch {
    /// Build the search from the run configuration, opening the found-results
    /// file if one is configured.
    pub fn new(config: &RunConfig) -> Result<Self, PoolError> {
        let prefix = config
            .fingerprint
            .as_deref()
            .unwrap_or(DEFAULT_PREFIX)
            .to_ascii_lowercase();

        if prefix.is_empty() || prefix.len() > 32 || !prefix.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(PoolError::InvalidConfig(format!(
                "fingerprint must be 1 to 32 hex digits, got {:?}",
                prefix
            )));
        }

        let found_file = match &config.found_path {
            Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
            None => None,
        };

        Ok(Self {
            prefix,
            found_file,
            ansi: atty::is(atty::Stream::Stdout),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `candidate` (lowercase hex) matches the prefix.
    pub fn is_match(&self, candidate: &str) -> bool {
        candidate.starts_with(&self.prefix)
    }

    fn record_match(&self, ctx: &UnitContext, candidate: &str) {
        ctx.gate().with_lock(|| {
            if let Some(mut file) = self.found_file.as_ref() {
                if let Err(e) = writeln!(file, "{}", candidate) {
                    warn!(error = %e, "Failed to append match to found file");
                }
            }

            if !ctx.config().no_text {
                let line = if self.ansi {
                    format!("\n{} {}", "[FOUND]".green(), candidate)
                } else {
                    format!("\n[FOUND] {}", candidate)
                };
                let mut out = io::stdout().lock();
                if let Err(e) = writeln!(out, "{}", line) {
                    debug!(error = %e, "Failed to print match");
                }
            }
        });

        ctx.counters().add_found(1);
        info!(unit_id = ctx.unit_id(), candidate, "Match found");
    }
}

impl WorkerEntry for PrefixSearch {
    fn run(&self, ctx: &UnitContext) {
        let batch = if ctx.config().fast_mode { FAST_BATCH } else { 1 };
        let limit = ctx.config().limit;
        let mut produced: u64 = 0;
        let mut buf = Uuid::encode_buffer();

        while !ctx.should_stop() {
            let n = match limit {
                Some(limit) if produced >= limit => break,
                Some(limit) => batch.min(limit - produced),
                None => batch,
            };

            for _ in 0..n {
                let candidate = Uuid::new_v4().simple().encode_lower(&mut buf);
                if self.is_match(candidate) {
                    let candidate = candidate.to_string();
                    self.record_match(ctx, &candidate);
                }
            }

            ctx.counters().add_generated(n);
            produced += n;
        }

        debug!(unit_id = ctx.unit_id(), produced, "Search finished");
    }
}
