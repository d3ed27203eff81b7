//! Bounded polling validator

use crate::assertion::Assertion;
use crate::errors::GateError;
use action_primitives::ActionError;
use async_trait::async_trait;
use page_adapter::PageHandle;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

/// One observation of an assertion against the live page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub passed: bool,
    pub observed: String,
}

/// Final result of a satisfied assertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateResult {
    pub assertion: String,
    pub observed: String,
    pub polls: u32,
    pub latency_ms: u64,
}

#[async_trait]
pub trait AssertionValidator: Send + Sync {
    /// Observe once, without waiting.
    async fn check(&self, page: &PageHandle, assertion: &Assertion)
        -> Result<Observation, GateError>;

    /// Re-check until the assertion holds or the bound expires.
    async fn expect(&self, page: &PageHandle, assertion: &Assertion)
        -> Result<GateResult, ActionError>;
}

/// Default [`AssertionValidator`].
#[derive(Debug, Clone)]
pub struct PollingValidator {
    timeout: Duration,
    poll_interval: Duration,
}

impl PollingValidator {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: Duration::from_millis(100),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

impl Default for PollingValidator {
    fn default() -> Self {
        Self::new(Duration::from_millis(10000))
    }
}

#[async_trait]
impl AssertionValidator for PollingValidator {
    async fn check(
        &self,
        page: &PageHandle,
        assertion: &Assertion,
    ) -> Result<Observation, GateError> {
        let observation = match assertion {
            Assertion::UrlMatches { pattern } => {
                let url = page.current_url().await?;
                Observation {
                    passed: pattern.is_match(&url),
                    observed: url,
                }
            }
            Assertion::Visible { selector } => {
                let count = page.find_all(selector).await?;
                Observation {
                    passed: count > 0,
                    observed: format!("{} visible", count),
                }
            }
            Assertion::Hidden { selector } => {
                let count = page.find_all(selector).await?;
                Observation {
                    passed: count == 0,
                    observed: format!("{} visible", count),
                }
            }
            Assertion::TextContains { selector, text } => {
                let actual = page.read_text(selector).await?;
                Observation {
                    passed: actual.contains(text.as_str()),
                    observed: format!("{:?}", actual),
                }
            }
            Assertion::CountEquals { selector, count } => {
                let actual = page.find_all(selector).await?;
                Observation {
                    passed: actual == *count,
                    observed: format!("{} element(s)", actual),
                }
            }
            Assertion::InputValueEquals { selector, value } => {
                let actual = page.input_value(selector).await?;
                Observation {
                    passed: actual == *value,
                    observed: format!("{:?}", actual),
                }
            }
            Assertion::SortedBy { selector, order } => {
                let values = page.read_all_text(selector).await?;
                Observation {
                    passed: !values.is_empty() && order.is_sorted(&values)?,
                    observed: format!("{:?}", values),
                }
            }
        };
        Ok(observation)
    }

    async fn expect(
        &self,
        page: &PageHandle,
        assertion: &Assertion,
    ) -> Result<GateResult, ActionError> {
        let start = Instant::now();
        let mut polls = 0u32;

        loop {
            polls += 1;
            let remaining = self.timeout.saturating_sub(start.elapsed());
            let polled = timeout(remaining, self.check(page, assertion)).await;
            let observed = match polled {
                Err(_) => {
                    debug!(assertion = %assertion, "assertion check exceeded remaining bound");
                    format!("no observation within {}ms", self.timeout.as_millis())
                }
                Ok(Ok(observation)) if observation.passed => {
                    let latency_ms = start.elapsed().as_millis() as u64;
                    info!(assertion = %assertion, latency_ms, polls, "assertion satisfied");
                    return Ok(GateResult {
                        assertion: assertion.to_string(),
                        observed: observation.observed,
                        polls,
                        latency_ms,
                    });
                }
                Ok(Ok(observation)) => observation.observed,
                Ok(Err(err)) => {
                    debug!(assertion = %assertion, error = %err, "assertion check failed");
                    err.to_string()
                }
            };

            if start.elapsed() >= self.timeout {
                warn!(
                    assertion = %assertion,
                    observed = %observed,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "assertion mismatch"
                );
                return Err(ActionError::AssertionMismatch {
                    assertion: assertion.to_string(),
                    expected: assertion.expected(),
                    observed,
                });
            }
            sleep(self.poll_interval).await;
        }
    }
}
