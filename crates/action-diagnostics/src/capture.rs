use crate::errors::DiagnosticsError;
use crate::PNG_MIME;
use action_primitives::DiagnosticBundle;
use async_trait::async_trait;
use chrono::Utc;
use page_adapter::{ArtifactRef, ArtifactSink, PageHandle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use storefront_core_types::ScenarioId;
use tracing::{info, warn};

/// Hook invoked by the resolver once per exhausted action.
#[async_trait]
pub trait FailureDiagnostics: Send + Sync {
    async fn capture_on_failure(
        &self,
        page: &PageHandle,
        action_description: &str,
    ) -> Result<DiagnosticBundle, DiagnosticsError>;
}

/// Screenshot-based [`FailureDiagnostics`] scoped to one scenario.
pub struct DiagnosticsCapture {
    sink: Arc<dyn ArtifactSink>,
    scenario: ScenarioId,
    captures: AtomicUsize,
}

impl DiagnosticsCapture {
    pub fn new(sink: Arc<dyn ArtifactSink>, scenario: ScenarioId) -> Self {
        Self {
            sink,
            scenario,
            captures: AtomicUsize::new(0),
        }
    }

    pub fn scenario(&self) -> &ScenarioId {
        &self.scenario
    }

    /// Capture attempts made so far, successful or not.
    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FailureDiagnostics for DiagnosticsCapture {
    async fn capture_on_failure(
        &self,
        page: &PageHandle,
        action_description: &str,
    ) -> Result<DiagnosticBundle, DiagnosticsError> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        let label = format!("{}: {}", self.scenario, action_description);
        let artifact_name = format!(
            "failure-{}-{}.png",
            slug(self.scenario.as_str()),
            slug(action_description)
        );

        let bytes = page.screenshot(true).await.map_err(|err| {
            warn!(label = %label, error = %err, "failure screenshot unavailable");
            DiagnosticsError::Screenshot(err)
        })?;
        let screenshot = self
            .sink
            .attach_artifact(&artifact_name, bytes, PNG_MIME)
            .await
            .map_err(|source| DiagnosticsError::Store {
                name: artifact_name.clone(),
                source,
            })?;

        info!(label = %label, artifact = %artifact_name, "failure diagnostics captured");
        Ok(DiagnosticBundle {
            artifact_name,
            label,
            screenshot,
            associated_action_description: action_description.to_string(),
            timestamp: Utc::now(),
        })
    }
}

/// Full-page checkpoint screenshot named `<scope>-<name>.png`.
pub async fn capture_checkpoint(
    page: &PageHandle,
    sink: &dyn ArtifactSink,
    scope: &str,
    name: &str,
) -> Result<ArtifactRef, DiagnosticsError> {
    let artifact_name = format!("{}-{}.png", slug(scope), slug(name));
    let bytes = page
        .screenshot(true)
        .await
        .map_err(DiagnosticsError::Screenshot)?;
    sink.attach_artifact(&artifact_name, bytes, PNG_MIME)
        .await
        .map_err(|source| DiagnosticsError::Store {
            name: artifact_name,
            source,
        })
}

/// Lowercase ASCII slug; runs of other characters collapse to one `-`.
pub fn slug(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_separators() {
        assert_eq!(slug("Activate checkout control!"), "activate-checkout-control");
        assert_eq!(slug("  performance_glitch / purchase "), "performance-glitch-purchase");
        assert_eq!(slug("***"), "");
    }
}
