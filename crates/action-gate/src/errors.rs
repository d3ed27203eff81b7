//! Error types for assertion evaluation

use page_adapter::AdapterError;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum GateError {
    /// Page driver failed while observing state
    #[error("driver error: {0}")]
    Driver(#[from] AdapterError),

    /// Observed text could not be interpreted
    #[error("unparseable value '{value}': {reason}")]
    Unparseable { value: String, reason: String },
}

impl GateError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, GateError::Driver(err) if err.retriable)
    }

    /// Get error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            GateError::Driver(_) => 2,
            GateError::Unparseable { .. } => 1,
        }
    }
}
