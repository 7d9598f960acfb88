// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded readiness polling with a per-attempt timeout.

use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Configuration for one polling session.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Upper bound on probe invocations. Zero means fail without probing.
    pub max_attempts: u32,
    /// A single probe running longer than this is abandoned as failed.
    pub per_attempt_timeout: Duration,
    /// Fixed delay between failed attempts.
    pub delay: Duration,
    /// Diagnostic name included in the exhaustion error.
    pub label: String,
}

impl RetryPolicy {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            max_attempts: 10,
            per_attempt_timeout: Duration::from_secs(10),
            delay: Duration::from_millis(500),
            label: label.into(),
        }
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn per_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.per_attempt_timeout = timeout;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Terminal polling failure, surfaced after the attempt budget is spent.
#[derive(Debug)]
pub enum PollError {
    Exhausted { label: String, attempts: u32, last_error: anyhow::Error },
}

impl fmt::Display for PollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { label, attempts, last_error } => {
                write!(f, "{label}: gave up after {attempts} attempts: {last_error:#}")
            }
        }
    }
}

impl std::error::Error for PollError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Exhausted { last_error, .. } => {
                let source: &(dyn std::error::Error + 'static) = last_error.as_ref();
                Some(source)
            }
        }
    }
}

impl PollError {
    /// Number of probe invocations performed before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } => *attempts,
        }
    }
}

/// Run `probe` until it succeeds or the policy's attempt budget is spent.
///
/// Each attempt is bounded by `per_attempt_timeout`; a timed-out probe
/// counts as one failed attempt. The probe decides what success means —
/// the poller only sequences attempts, delays, and accounting.
pub async fn poll<T, F, Fut>(policy: &RetryPolicy, mut probe: F) -> Result<T, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut attempts = 0u32;
    let mut last_error = anyhow::anyhow!("no attempts were made");

    while attempts < policy.max_attempts {
        match tokio::time::timeout(policy.per_attempt_timeout, probe()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => last_error = e,
            Err(_) => {
                last_error = anyhow::anyhow!(
                    "probe timed out after {:?}",
                    policy.per_attempt_timeout
                );
            }
        }

        attempts += 1;
        if attempts >= policy.max_attempts {
            break;
        }

        tracing::debug!(
            label = %policy.label,
            attempt = attempts,
            err = %last_error,
            "probe failed, retrying"
        );
        tokio::time::sleep(policy.delay).await;
    }

    Err(PollError::Exhausted { label: policy.label.clone(), attempts, last_error })
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;
