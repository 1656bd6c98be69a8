//! Exponential reconnect backoff for bus connections.
//!
//! The delay starts at `initial`, doubles after every failed attempt and is
//! capped at `max`. After `max_retries` consecutive failures the policy gives
//! up and the caller surfaces [`QtError::Connection`]. A successful attempt
//! resets the policy.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::{QtError, Result};

/// Reconnect settings as they appear in the JSON config.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    pub initial_ms: u64,
    pub max_ms: u64,
    pub max_retries: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self { initial_ms: 100, max_ms: 30_000, max_retries: 10 }
    }
}

/// Stateful exponential backoff.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    max_retries: u32,
    current: Duration,
    attempts: u32,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration, max_retries: u32) -> Self {
        Self { initial, max, max_retries, current: initial, attempts: 0 }
    }

    pub fn from_config(config: &BackoffConfig) -> Self {
        Self::new(
            Duration::from_millis(config.initial_ms),
            Duration::from_millis(config.max_ms),
            config.max_retries,
        )
    }

    /// Delay to wait before the next attempt, or `None` once retries are exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.max_retries {
            return None;
        }
        let delay = self.current;
        self.attempts += 1;
        self.current = (self.current * 2).min(self.max);
        Some(delay)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Reset after a successful attempt.
    pub fn reset(&mut self) {
        self.current = self.initial;
        self.attempts = 0;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::from_config(&BackoffConfig::default())
    }
}

/// Run `op` until it succeeds, retrying transient errors with `backoff`.
///
/// Non-transient errors are returned immediately. When retries run out the
/// last error is wrapped in [`QtError::Connection`].
pub async fn retry<T, F, Fut>(backoff: &mut Backoff, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    loop {
        match op().await {
            Ok(v) => {
                backoff.reset();
                return Ok(v);
            }
            Err(e) if e.is_transient() => match backoff.next_delay() {
                Some(delay) => {
                    warn!("{what} failed: {e}, retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                }
                None => {
                    return Err(QtError::Connection(format!(
                        "{what} failed after {} attempts: {e}",
                        backoff.attempts()
                    )));
                }
            },
            Err(e) => return Err(e),
        }
    }
}
