use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL_US: u64 = 1_000;
pub const DEFAULT_STOP_TIMEOUT_MS: u64 = 5_000;

/// Channel buffering policy.
///
/// `capacity: None` is the unbounded FIFO of the dataflow model; a capacity
/// turns on backpressure, which is only meant for experiments and tests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub capacity: Option<usize>,
    /// How often a blocked get/put re-checks its cancel token.
    pub poll_interval_us: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            capacity: None,
            poll_interval_us: DEFAULT_POLL_INTERVAL_US,
        }
    }
}

impl ChannelConfig {
    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_micros(self.poll_interval_us.max(1))
    }
}

/// Per-unit launch options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UnitConfig {
    /// Overrides the unit's own name in logs and thread names.
    pub name: Option<String>,
    /// Firing bound, 0 runs forever. `None` takes the network default.
    pub max_firings: Option<u64>,
    /// Pin the unit thread to this core.
    pub core_id: Option<usize>,
}

impl UnitConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_max_firings(mut self, max_firings: u64) -> Self {
        self.max_firings = Some(max_firings);
        self
    }

    pub fn with_core(mut self, core_id: usize) -> Self {
        self.core_id = Some(core_id);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Used by [`Network::channel`](crate::network::Network::channel).
    pub channel: ChannelConfig,
    /// Firing bound for units spawned without one.
    pub default_max_firings: u64,
    /// How long `stop` waits for unit threads to exit.
    pub stop_timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            channel: ChannelConfig::default(),
            default_max_firings: 0,
            stop_timeout_ms: DEFAULT_STOP_TIMEOUT_MS,
        }
    }
}

impl NetworkConfig {
    #[inline]
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}
