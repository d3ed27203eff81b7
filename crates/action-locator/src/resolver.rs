//! Ordered fallback resolver

use action_diagnostics::{DiagnosticsError, FailureDiagnostics};
use action_primitives::{
    instrument, perform, ActionOutcome, AttemptRecord, CandidateStrategy, LogicalAction,
    NavigationRaceCoordinator, NavigationRaceOutcome, StrategyResult,
};
use async_trait::async_trait;
use page_adapter::PageHandle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Resolves a logical action against a page.
#[async_trait]
pub trait ActionResolver: Send + Sync {
    async fn resolve(&self, page: &PageHandle, action: &LogicalAction) -> ActionOutcome;
}

/// Time budgets applied by the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Bound on each presence check
    pub presence_check_ms: u64,

    /// Execution bound for candidates that declare none
    pub action_ms: u64,

    /// Bound on the failure capture after exhaustion
    #[serde(default = "default_capture_ms")]
    pub capture_ms: u64,
}

fn default_capture_ms() -> u64 {
    10000
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            presence_check_ms: 1000,
            action_ms: 15000,
            capture_ms: default_capture_ms(),
        }
    }
}

/// Default [`ActionResolver`].
pub struct LocatorStrategyResolver {
    config: ResolverConfig,
    navigation: NavigationRaceCoordinator,
    diagnostics: Option<Arc<dyn FailureDiagnostics>>,
}

impl LocatorStrategyResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            navigation: NavigationRaceCoordinator::default(),
            diagnostics: None,
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn FailureDiagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn with_navigation(mut self, navigation: NavigationRaceCoordinator) -> Self {
        self.navigation = navigation;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    async fn is_present(&self, page: &PageHandle, selector: &str) -> bool {
        let budget = Duration::from_millis(self.config.presence_check_ms);
        match timeout(budget, page.find_all(selector)).await {
            Ok(Ok(count)) => count > 0,
            Ok(Err(err)) => {
                debug!(candidate = %selector, error = %err, "presence check failed");
                false
            }
            Err(_) => {
                debug!(candidate = %selector, "presence check exceeded budget");
                false
            }
        }
    }

    async fn attempt(
        &self,
        page: &PageHandle,
        action: &LogicalAction,
        candidate: &CandidateStrategy,
    ) -> (StrategyResult, Option<NavigationRaceOutcome>) {
        if !self.is_present(page, &candidate.selector).await {
            return (StrategyResult::NotPresent, None);
        }

        let budget = Duration::from_millis(candidate.timeout_ms.unwrap_or(self.config.action_ms));
        let execution = perform(page.as_ref(), &candidate.selector, action.interaction(), budget);

        let executed = match action.transition() {
            Some(expectation) => self
                .navigation
                .await_expectation(page, execution, expectation)
                .await
                .map(Some),
            None => execution.await.map(|_| None),
        };

        match executed {
            Ok(transition) => (StrategyResult::ExecutedSuccessfully, transition),
            Err(err) => (
                StrategyResult::PresentButExecutionFailed {
                    reason: err.to_string(),
                },
                None,
            ),
        }
    }

    async fn exhausted(
        &self,
        page: &PageHandle,
        action: &LogicalAction,
        attempts: Vec<AttemptRecord>,
        started: Instant,
    ) -> ActionOutcome {
        warn!(
            action = %action.description(),
            attempted = attempts.len(),
            "all candidate strategies exhausted"
        );

        let mut warnings = Vec::new();
        let diagnostics_ref = match &self.diagnostics {
            Some(diagnostics) => {
                let budget = Duration::from_millis(self.config.capture_ms);
                let captured = timeout(budget, diagnostics.capture_on_failure(page, action.description()))
                    .await
                    .unwrap_or_else(|_| Err(DiagnosticsError::TimedOut(self.config.capture_ms)));
                match captured {
                    Ok(bundle) => Some(bundle),
                    Err(err) => {
                        warn!(action = %action.description(), error = %err, "diagnostics capture failed");
                        warnings.push(
                            action_primitives::ActionError::DiagnosticsCaptureFailed(err.to_string())
                                .to_string(),
                        );
                        None
                    }
                }
            }
            None => None,
        };

        ActionOutcome::StrategyExhausted {
            attempts,
            diagnostics_ref,
            warnings,
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }
}

impl Default for LocatorStrategyResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

#[async_trait]
impl ActionResolver for LocatorStrategyResolver {
    async fn resolve(&self, page: &PageHandle, action: &LogicalAction) -> ActionOutcome {
        let started = Instant::now();
        info!(
            action = %action.description(),
            interaction = action.interaction().name(),
            candidates = action.candidates().len(),
            "resolving logical action"
        );

        let mut attempts = Vec::with_capacity(action.candidates().len());
        for candidate in action.candidates() {
            let timed = instrument(self.attempt(page, action, candidate)).await;
            let elapsed_ms = timed.elapsed_ms;
            let (result, transition) = timed.value;

            match &result {
                StrategyResult::NotPresent => {
                    debug!(candidate = %candidate, "candidate not present");
                }
                StrategyResult::PresentButExecutionFailed { reason } => {
                    warn!(candidate = %candidate, reason = %reason, "candidate present but execution failed");
                }
                StrategyResult::ExecutedSuccessfully => {}
            }

            let succeeded = result.is_success();
            attempts.push(AttemptRecord {
                selector: candidate.selector.clone(),
                result,
                elapsed_ms,
            });

            if succeeded {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                info!(
                    action = %action.description(),
                    succeeded_via = %candidate,
                    elapsed_ms,
                    "logical action resolved"
                );
                return ActionOutcome::Succeeded {
                    succeeded_via: candidate.selector.clone(),
                    elapsed_ms,
                    attempts,
                    transition,
                };
            }
        }

        self.exhausted(page, action, attempts, started).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_budgets() {
        let config = ResolverConfig::default();
        assert_eq!(config.presence_check_ms, 1000);
        assert_eq!(config.action_ms, 15000);
        assert_eq!(config.capture_ms, 10000);
    }
}
