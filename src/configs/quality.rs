use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::poller::PollLimits;

/// Tuning for the quality negotiation poll.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QualityConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Unbounded when absent.
    #[serde(default)]
    pub max_attempts: Option<u32>,
    /// `0` disables the timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: Option<u64>,
}

impl QualityConfig {
    pub fn poll_limits(&self) -> PollLimits {
        PollLimits {
            interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            max_attempts: self.max_attempts,
            timeout: self
                .timeout_ms
                .filter(|&ms| ms > 0)
                .map(Duration::from_millis),
        }
    }
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_attempts: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_timeout_ms() -> Option<u64> {
    Some(60_000)
}
