//! Fixed-interval readiness polling.
//!
//! The widget never announces that its capability surface is ready, so the
//! only way to find out is to sample it. `poll_until` turns that into a
//! future that resolves once, on the first successful probe.

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

use crate::common::errors::PollError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollLimits {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
    pub timeout: Option<Duration>,
}

impl PollLimits {
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
            timeout: None,
        }
    }
}

impl Default for PollLimits {
    fn default() -> Self {
        Self::unbounded(Duration::from_millis(100))
    }
}

/// Probe every `limits.interval` until `probe` yields a value.
///
/// The first probe happens one interval after the call. `None` from the
/// probe always means "not yet"; it is never an error. Dropping the future
/// cancels the poll.
pub async fn poll_until<T, F>(limits: &PollLimits, mut probe: F) -> Result<T, PollError>
where
    F: FnMut() -> Option<T>,
{
    // `interval_at` panics on a zero period.
    let interval = limits.interval.max(Duration::from_millis(1));
    let max_attempts = limits.max_attempts;

    let attempts = async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempt: u32 = 0;

        loop {
            ticker.tick().await;
            attempt = attempt.saturating_add(1);

            if let Some(value) = probe() {
                trace!("capability ready after {} attempt(s)", attempt);
                return Ok(value);
            }

            if let Some(max) = max_attempts {
                if attempt >= max {
                    return Err(PollError::Exhausted(attempt));
                }
            }
        }
    };

    match limits.timeout {
        Some(limit) => tokio::time::timeout(limit, attempts)
            .await
            .unwrap_or_else(|_| Err(PollError::Timeout(limit))),
        None => attempts.await,
    }
}
