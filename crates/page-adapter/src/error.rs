use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// High-level error categories surfaced by a page driver.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdapterErrorKind {
    #[error("operation timed out")]
    Timeout,
    #[error("driver i/o failure")]
    Io,
    #[error("target element not found")]
    TargetNotFound,
    #[error("target element not interactable")]
    NotInteractable,
    #[error("option not found")]
    OptionNotFound,
    #[error("browsing context closed")]
    ContextClosed,
    #[error("artifact store failure")]
    ArtifactStore,
    #[error("internal error")]
    Internal,
}

/// Enriched error metadata passed back to higher layers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdapterError {
    pub kind: AdapterErrorKind,
    pub hint: Option<String>,
    pub retriable: bool,
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(hint) = &self.hint {
            write!(f, ": {}", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for AdapterError {}

impl AdapterError {
    pub fn new(kind: AdapterErrorKind) -> Self {
        Self {
            kind,
            hint: None,
            retriable: false,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn retriable(mut self, flag: bool) -> Self {
        self.retriable = flag;
        self
    }

    pub fn target_not_found(selector: &str) -> Self {
        Self::new(AdapterErrorKind::TargetNotFound)
            .with_hint(format!("no element matches '{}'", selector))
    }

    pub fn context_closed() -> Self {
        Self::new(AdapterErrorKind::ContextClosed)
    }

    pub fn timeout(operation: &str, after: std::time::Duration) -> Self {
        Self::new(AdapterErrorKind::Timeout)
            .with_hint(format!("{} exceeded {}ms", operation, after.as_millis()))
            .retriable(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_hint() {
        let err = AdapterError::target_not_found("#checkout");
        assert_eq!(
            err.to_string(),
            "target element not found: no element matches '#checkout'"
        );
        assert!(!err.retriable);
    }
}
