use std::time::Duration;

pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(20);
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_secs(2);
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "genpool-unit-";

/// Runtime settings of the coordinator itself, as opposed to the
/// [`RunConfig`](genpool_api::RunConfig) the units read.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Time between two monitor samples.
    pub update_interval: Duration,

    /// How long the shutdown controller waits for units to honour a stop request
    /// after an interrupt before retiring them forcibly.
    pub drain_grace: Duration,

    /// Prefix of unit thread names; the unit id is appended.
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
            drain_grace: DEFAULT_DRAIN_GRACE,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl PoolConfig {
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        // tokio intervals panic on a zero period.
        self.update_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }
}
