//! Exponential backoff for transient completion service failures.

use crate::config::RetrySettings;
use crate::error::{CommentaryError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// How often and how patiently to retry a failed call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts including the first one.
    pub attempts: u32,
    pub exp_base: f64,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        let settings = RetrySettings::default();
        Self {
            attempts: settings.attempts,
            exp_base: settings.exp_base,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            retryable_statuses: settings.http_status_codes,
        }
    }
}

impl TryFrom<&RetrySettings> for RetryPolicy {
    type Error = CommentaryError;

    fn try_from(settings: &RetrySettings) -> Result<Self> {
        if !settings.exp_base.is_finite() || settings.exp_base < 1.0 {
            return Err(CommentaryError::Config(format!(
                "retry.exp_base must be a finite number >= 1, got {}",
                settings.exp_base
            )));
        }

        Ok(Self {
            attempts: settings.attempts.max(1),
            exp_base: settings.exp_base,
            initial_delay: delay_setting("initial_delay_seconds", settings.initial_delay_seconds)?,
            max_delay: delay_setting("max_delay_seconds", settings.max_delay_seconds)?,
            retryable_statuses: settings.http_status_codes.clone(),
        })
    }
}

fn delay_setting(name: &str, seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds).map_err(|e| {
        CommentaryError::Config(format!("retry.{} = {} is not a valid delay: {}", name, seconds, e))
    })
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before the given retry (1 = first retry), capped at `max_delay`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.exp_base.powi(exponent);
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(secs.max(0.0))
        }
    }

    /// Whether an error is transient under this policy: a listed HTTP status, or a
    /// request that timed out or never connected.
    pub fn is_retryable(&self, err: &CommentaryError) -> bool {
        match err {
            CommentaryError::Service {
                status: Some(status),
                ..
            } => self.retryable_statuses.contains(status),
            CommentaryError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Run an operation, retrying transient failures with exponential backoff.
///
/// Non-retryable errors are returned immediately. When every attempt fails with a
/// retryable error the result is [`CommentaryError::RetryExhausted`].
pub async fn retry_with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        if attempt > 1 {
            debug!(operation = operation_name, attempt, "Retrying completion call");
        }

        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if policy.is_retryable(&err) => {
                if attempt >= max_attempts {
                    warn!(
                        operation = operation_name,
                        attempt,
                        error = %err,
                        "Completion call failed: retry budget exhausted"
                    );
                    return Err(CommentaryError::RetryExhausted {
                        attempts: attempt,
                        last_error: err.to_string(),
                    });
                }

                let delay = policy.delay_for(attempt);
                warn!(
                    operation = operation_name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient completion error, backing off"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
