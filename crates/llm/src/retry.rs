//! Retry With Backoff
//!
//! Bounded retry loop around a single `send_message` call. Transient failures
//! (rate limits, 5xx, network) are retried with exponential backoff; anything
//! else surfaces immediately.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::provider::LlmProvider;
use crate::types::{LlmError, LlmRequestOptions, LlmResponse, LlmResult, Message};

/// Retry limits for one model call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one. `1` disables retries.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound for a single backoff delay.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Total wall-clock budget across all attempts, in seconds.
    #[serde(default = "default_max_elapsed_secs")]
    pub max_elapsed_secs: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_max_elapsed_secs() -> u64 {
    300
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_elapsed_secs: default_max_elapsed_secs(),
        }
    }
}

impl RetryPolicy {
    /// One attempt, no retries.
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Backoff before retry number `attempt + 1` (zero-based `attempt`).
    ///
    /// A server-provided `retry_after` wins when it is longer than the
    /// computed delay.
    pub fn delay_for(&self, attempt: u32, err: &LlmError) -> Duration {
        let backoff = self
            .base_delay_ms
            .saturating_mul(1u64 << attempt.min(20))
            .min(self.max_delay_ms);
        let wait_ms = match err.retry_after_secs() {
            Some(secs) => backoff.max(secs.saturating_mul(1000)),
            None => backoff,
        };
        Duration::from_millis(wait_ms)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    fn max_elapsed(&self) -> Duration {
        Duration::from_secs(self.max_elapsed_secs)
    }
}

/// Send one completion request under `policy`.
///
/// Returns the provider's own error when no retry was made, and
/// `LlmError::RetriesExhausted` when at least one retry was made and the last
/// attempt still failed.
pub async fn send_with_retry(
    provider: &dyn LlmProvider,
    messages: &[Message],
    system: Option<&str>,
    request_options: &LlmRequestOptions,
    policy: &RetryPolicy,
) -> LlmResult<LlmResponse> {
    let started = Instant::now();
    let max_attempts = policy.attempts();
    let mut attempt: u32 = 0;

    loop {
        let result = provider
            .send_message(
                messages.to_vec(),
                system.map(str::to_string),
                request_options.clone(),
            )
            .await;

        let err = match result {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };
        let made = attempt + 1;

        if !err.is_retryable() {
            return Err(err);
        }

        let wait = policy.delay_for(attempt, &err);
        let out_of_attempts = made >= max_attempts;
        let out_of_time = started.elapsed() + wait > policy.max_elapsed();

        if out_of_attempts || out_of_time {
            if made == 1 {
                return Err(err);
            }
            tracing::error!(
                provider = provider.name(),
                attempts = made,
                error = %err,
                "model call failed after retries"
            );
            return Err(LlmError::RetriesExhausted {
                attempts: made,
                last_error: err.to_string(),
            });
        }

        tracing::warn!(
            provider = provider.name(),
            attempt = made,
            max_attempts,
            wait_ms = wait.as_millis() as u64,
            error = %err,
            "retryable model error, backing off"
        );

        tokio::time::sleep(wait).await;
        attempt += 1;
    }
}
