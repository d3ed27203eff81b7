//! Per-persona journey runs against isolated sessions

use crate::config::Config;
use action_diagnostics::{DiagnosticsCapture, FsArtifactSink};
use action_flow::{
    builtin_personas, FlowError, JourneyCatalog, JourneyExecutor, JourneyReport, PersonaProfile,
    SessionOrchestrator,
};
use action_gate::PollingValidator;
use action_locator::{LocatorStrategyResolver, ResolverConfig};
use anyhow::{Context, Result};
use page_adapter::{ArtifactSink, PageHandle};
use std::sync::Arc;
use std::time::Duration;
use storefront_core_types::ScenarioId;
use storefront_sim::SimBrowser;
use tracing::info;

/// Runs journeys one persona at a time, each in a fresh session.
pub struct VerifyRunner {
    config: Config,
    browser: SimBrowser,
    catalog: JourneyCatalog,
    artifacts: Arc<dyn ArtifactSink>,
}

impl VerifyRunner {
    pub fn new(config: Config) -> Self {
        let artifacts: Arc<dyn ArtifactSink> = Arc::new(FsArtifactSink::new(config.artifacts_dir()));
        Self::with_artifacts(config, artifacts)
    }

    pub fn with_artifacts(config: Config, artifacts: Arc<dyn ArtifactSink>) -> Self {
        Self {
            browser: SimBrowser::launch(config.sim_config()),
            catalog: JourneyCatalog::new(config.journey_settings()),
            config,
            artifacts,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn personas(&self) -> Vec<PersonaProfile> {
        builtin_personas(&self.config.password)
    }

    /// Resolve persona keys; an empty selection means every persona.
    pub fn select_personas(&self, keys: &[String]) -> Result<Vec<PersonaProfile>, FlowError> {
        let all = self.personas();
        if keys.is_empty() {
            return Ok(all);
        }
        keys.iter()
            .map(|key| {
                all.iter()
                    .find(|p| &p.key == key)
                    .cloned()
                    .ok_or_else(|| FlowError::UnknownPersona(key.clone()))
            })
            .collect()
    }

    fn orchestrator(&self, journey: &str, persona: &PersonaProfile) -> Result<SessionOrchestrator> {
        let timeouts = &self.config.timeouts;
        let scenario = ScenarioId::parse(format!("{}-{}", persona.key, journey))
            .context("Invalid scenario name")?;
        let diagnostics = DiagnosticsCapture::new(self.artifacts.clone(), scenario);
        let resolver = LocatorStrategyResolver::new(ResolverConfig {
            presence_check_ms: timeouts.presence_check_ms,
            action_ms: timeouts.action_ms,
            capture_ms: timeouts.capture_ms,
        })
        .with_diagnostics(Arc::new(diagnostics));
        let validator = PollingValidator::new(Duration::from_millis(timeouts.expect_ms));

        let mut orchestrator = SessionOrchestrator::new(Arc::new(resolver), Arc::new(validator))
            .with_journey_timeout(Duration::from_millis(timeouts.journey_ms));
        if self.config.screenshots.on_checkpoint {
            orchestrator = orchestrator.with_checkpoints(self.artifacts.clone());
        }
        Ok(orchestrator)
    }

    pub async fn run(&self, journey: &str, persona: &PersonaProfile) -> Result<JourneyReport> {
        let definition = self.catalog.by_name(journey, persona)?;
        let orchestrator = self.orchestrator(journey, persona)?;
        let page: PageHandle = self.browser.new_context();
        info!(journey, persona = %persona.key, "running journey in fresh session");
        Ok(orchestrator.execute(&definition, persona, page).await)
    }

    /// Run `journey` for each persona in turn.
    pub async fn run_all(
        &self,
        journey: &str,
        personas: &[PersonaProfile],
    ) -> Result<Vec<JourneyReport>> {
        let mut reports = Vec::with_capacity(personas.len());
        for persona in personas {
            reports.push(self.run(journey, persona).await?);
        }
        Ok(reports)
    }
}
