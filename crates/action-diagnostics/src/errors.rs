use page_adapter::AdapterError;
use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum DiagnosticsError {
    #[error("screenshot failed: {0}")]
    Screenshot(AdapterError),
    #[error("artifact store rejected '{name}': {source}")]
    Store { name: String, source: AdapterError },
    #[error("capture exceeded {0}ms")]
    TimedOut(u64),
}

impl DiagnosticsError {
    pub fn is_retryable(&self) -> bool {
        match self {
            DiagnosticsError::Screenshot(err) => err.retriable,
            DiagnosticsError::Store { source, .. } => source.retriable,
            DiagnosticsError::TimedOut(_) => true,
        }
    }
}
