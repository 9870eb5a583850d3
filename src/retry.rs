//! Retry decisions and exponential backoff with jitter.
//!
//! Only network failures and 5xx API answers are retried. Validation errors,
//! rate limits and every other 4xx answer surface on first occurrence.

use std::time::Duration;

use rand::Rng;
use serde_json::Value as JsonValue;

use crate::MelonlyError;

/// Delay before the first retry, doubled on every further attempt.
pub const BASE_DELAY_MS: u64 = 1_000;
/// Upper bound of the exponential part of the delay.
pub const MAX_BASE_DELAY_MS: u64 = 10_000;
/// Jitter is drawn uniformly from `[0, MAX_JITTER_MS)`.
pub const MAX_JITTER_MS: u64 = 1_000;

/// What one attempt produced.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(JsonValue),
    RetryableFailure(MelonlyError),
    TerminalFailure(MelonlyError),
}

impl AttemptOutcome {
    pub fn classify(result: crate::Result<JsonValue>) -> Self {
        match result {
            Ok(payload) => Self::Success(payload),
            Err(err) if err.is_retryable() => Self::RetryableFailure(err),
            Err(err) => Self::TerminalFailure(err),
        }
    }
}

/// Whether to try again, and after how long.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryDecision {
    pub retry: bool,
    pub delay: Duration,
}

impl RetryDecision {
    const STOP: Self = Self {
        retry: false,
        delay: Duration::ZERO,
    };
}

/// Bounds the number of attempts of one logical call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    /// `max_retries` counts total attempts; `0` still allows one.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_attempts: max_retries.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decides what follows the failed attempt number `attempt` (1-based).
    pub fn should_retry(&self, attempt: u32, failure: &MelonlyError) -> RetryDecision {
        if !failure.is_retryable() || attempt >= self.max_attempts {
            return RetryDecision::STOP;
        }
        RetryDecision {
            retry: true,
            delay: backoff_delay(attempt),
        }
    }
}

/// Exponential part of the delay after attempt `attempt` (1-based):
/// `min(1000 * 2^(attempt - 1), 10000)` milliseconds.
pub fn base_delay_ms(attempt: u32) -> u64 {
    let exp = attempt.saturating_sub(1).min(16);
    BASE_DELAY_MS
        .saturating_mul(1u64 << exp)
        .min(MAX_BASE_DELAY_MS)
}

/// Full delay with a given jitter, clamped below [`MAX_JITTER_MS`].
pub fn delay_with_jitter(attempt: u32, jitter_ms: u64) -> Duration {
    let jitter_ms = jitter_ms.min(MAX_JITTER_MS - 1);
    Duration::from_millis(base_delay_ms(attempt) + jitter_ms)
}

/// Delay after attempt `attempt` with random jitter.
pub fn backoff_delay(attempt: u32) -> Duration {
    let jitter_ms = rand::thread_rng().gen_range(0..MAX_JITTER_MS);
    delay_with_jitter(attempt, jitter_ms)
}
