//! Flow execution error types

use thiserror::Error;

/// Flow execution errors
#[derive(Debug, Error)]
pub enum FlowError {
    /// Journey name not in the catalog
    #[error("Unknown journey: {0}")]
    UnknownJourney(String),

    /// Persona key not in the catalog
    #[error("Unknown persona: {0}")]
    UnknownPersona(String),

    /// Step id not present in a report
    #[error("Step {step_id} not found in journey {journey}")]
    UnknownStep { journey: String, step_id: String },

    /// Journey definition could not be built
    #[error("Invalid journey: {0}")]
    InvalidJourney(String),
}

impl FlowError {
    /// Catalog lookups and definitions never succeed on retry
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            FlowError::UnknownStep { .. } => 1,
            FlowError::UnknownJourney(_) | FlowError::UnknownPersona(_) => 2,
            FlowError::InvalidJourney(_) => 3,
        }
    }
}

impl From<action_primitives::ActionError> for FlowError {
    fn from(err: action_primitives::ActionError) -> Self {
        FlowError::InvalidJourney(err.to_string())
    }
}
