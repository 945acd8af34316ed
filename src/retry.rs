use std::time::Duration;

use crate::error::InitError;

/// Classification of a failed network attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connect or read timed out.
    Timeout,
    /// Server asked us to slow down (429, 503).
    Throttled,
    /// Connection refused/reset, DNS, truncated body.
    Connection,
    /// Any other 5xx.
    Http5xx(u16),
    /// Not worth retrying.
    Other,
}

impl ErrorKind {
    pub fn from_status(code: u16) -> Self {
        match code {
            429 | 503 => ErrorKind::Throttled,
            500..=599 => ErrorKind::Http5xx(code),
            _ => ErrorKind::Other,
        }
    }

    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            ErrorKind::Timeout
        } else if let Some(status) = e.status() {
            ErrorKind::from_status(status.as_u16())
        } else if e.is_connect() || e.is_request() || e.is_body() {
            ErrorKind::Connection
        } else {
            ErrorKind::Other
        }
    }

    fn is_transient(self) -> bool {
        !matches!(self, ErrorKind::Other)
    }
}

/// A failed attempt together with how it should be treated.
#[derive(Debug)]
pub struct Failure {
    pub kind: ErrorKind,
    pub error: InitError,
}

impl Failure {
    pub fn new(kind: ErrorKind, error: InitError) -> Self {
        Self { kind, error }
    }
}

impl From<InitError> for Failure {
    fn from(error: InitError) -> Self {
        Self::new(ErrorKind::Other, error)
    }
}

/// Exponential backoff with a cap.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_retries(0)
    }
}

impl RetryPolicy {
    /// Policy allowing `retries` attempts after the first one.
    pub fn with_retries(retries: u32) -> Self {
        Self {
            max_attempts: retries.saturating_add(1),
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(30),
        }
    }

    /// Delay before attempt `attempt + 1`, or `None` to give up.
    ///
    /// `attempt` is 1-based.
    pub fn next_delay(&self, attempt: u32, kind: ErrorKind) -> Option<Duration> {
        if attempt >= self.max_attempts || !kind.is_transient() {
            return None;
        }
        let exp = 1u32 << attempt.saturating_sub(1).min(8);
        Some(self.base_delay.saturating_mul(exp).min(self.max_delay))
    }

    /// Sleep before the next attempt, or hand back the error once out of attempts.
    pub async fn wait_or_give_up(
        &self,
        attempt: u32,
        failure: Failure,
        what: &str,
    ) -> Result<(), InitError> {
        let Some(delay) = self.next_delay(attempt, failure.kind) else {
            return Err(failure.error);
        };
        log_retry(what, attempt, delay, &failure.error);
        tokio::time::sleep(delay).await;
        Ok(())
    }
}

/// Warn about a failed attempt that will be retried after `delay`.
pub fn log_retry(what: &str, attempt: u32, delay: Duration, error: &InitError) {
    tracing::warn!(
        attempt,
        delay_ms = delay.as_millis() as u64,
        error = %error,
        "{what} failed, retrying"
    );
}
