//! Error types for action resolution

use crate::types::{AttemptRecord, DiagnosticBundle};
use page_adapter::AdapterError;
use thiserror::Error;

/// Failure taxonomy shared by the resolver, the gate and the orchestrator
#[derive(Debug, Error, Clone)]
pub enum ActionError {
    /// No candidate strategy executed successfully
    #[error("strategy exhausted for '{action}' after {} candidate(s)", .attempts.len())]
    StrategyExhausted {
        action: String,
        attempts: Vec<AttemptRecord>,
        diagnostics_ref: Option<DiagnosticBundle>,
        warnings: Vec<String>,
    },

    /// Neither the popup nor the same-page branch resolved in time
    #[error("navigation to '{pattern}' not observed within {timeout_ms}ms")]
    NavigationTimedOut { pattern: String, timeout_ms: u64 },

    /// Observed page state differs from the expectation
    #[error("assertion '{assertion}' failed: expected {expected}, observed {observed}")]
    AssertionMismatch {
        assertion: String,
        expected: String,
        observed: String,
    },

    /// Capturing failure diagnostics failed; only ever attached as a warning
    #[error("diagnostics capture failed: {0}")]
    DiagnosticsCaptureFailed(String),

    /// A bounded operation ran past its budget
    #[error("timed out: {0}")]
    Timeout(String),

    /// The action definition itself is unusable
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// Page driver failure outside the candidate loop
    #[error("driver error: {0}")]
    Driver(String),
}

impl ActionError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ActionError::NavigationTimedOut { .. } | ActionError::Timeout(_) | ActionError::Driver(_)
        )
    }

    /// Get error severity level (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            ActionError::InvalidAction(_) => 3,
            ActionError::StrategyExhausted { .. }
            | ActionError::NavigationTimedOut { .. }
            | ActionError::Driver(_) => 2,
            ActionError::AssertionMismatch { .. } | ActionError::Timeout(_) => 1,
            ActionError::DiagnosticsCaptureFailed(_) => 0,
        }
    }

    /// Short machine-readable kind, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ActionError::StrategyExhausted { .. } => "strategy_exhausted",
            ActionError::NavigationTimedOut { .. } => "navigation_timed_out",
            ActionError::AssertionMismatch { .. } => "assertion_mismatch",
            ActionError::DiagnosticsCaptureFailed(_) => "diagnostics_capture_failed",
            ActionError::Timeout(_) => "timeout",
            ActionError::InvalidAction(_) => "invalid_action",
            ActionError::Driver(_) => "driver",
        }
    }
}

impl From<AdapterError> for ActionError {
    fn from(err: AdapterError) -> Self {
        ActionError::Driver(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_message_counts_candidates() {
        let err = ActionError::StrategyExhausted {
            action: "activate checkout control".to_string(),
            attempts: Vec::new(),
            diagnostics_ref: None,
            warnings: Vec::new(),
        };
        assert_eq!(
            err.to_string(),
            "strategy exhausted for 'activate checkout control' after 0 candidate(s)"
        );
        assert_eq!(err.severity(), 2);
        assert!(!err.is_retryable());
    }

    #[test]
    fn capture_failure_is_lowest_severity() {
        let err = ActionError::DiagnosticsCaptureFailed("page closed".to_string());
        assert_eq!(err.severity(), 0);
        assert_eq!(err.kind(), "diagnostics_capture_failed");
    }
}
