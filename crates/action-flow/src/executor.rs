//! Journey executor implementation

use crate::persona::PersonaProfile;
use crate::types::*;
use action_diagnostics::capture_checkpoint;
use action_gate::AssertionValidator;
use action_locator::ActionResolver;
use action_primitives::{instrument, ActionError, LogicalAction, NavigationRaceKind};
use async_trait::async_trait;
use page_adapter::{ArtifactSink, PageHandle};
use std::sync::Arc;
use std::time::Instant;
use storefront_core_types::SessionId;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

/// Journey executor trait
#[async_trait]
pub trait JourneyExecutor: Send + Sync {
    /// Run every step of `journey` as `persona`, starting on `page`.
    ///
    /// Failures are reported, never returned: the report is always complete.
    async fn execute(
        &self,
        journey: &Journey,
        persona: &PersonaProfile,
        page: PageHandle,
    ) -> JourneyReport;
}

/// Runs journeys step by step, threading the current page handle through
/// navigation races and judging checks against the persona's deviations.
pub struct SessionOrchestrator {
    resolver: Arc<dyn ActionResolver>,
    validator: Arc<dyn AssertionValidator>,
    artifacts: Option<Arc<dyn ArtifactSink>>,
    journey_timeout: Duration,
}

impl SessionOrchestrator {
    pub fn new(resolver: Arc<dyn ActionResolver>, validator: Arc<dyn AssertionValidator>) -> Self {
        Self {
            resolver,
            validator,
            artifacts: None,
            journey_timeout: Duration::from_secs(60),
        }
    }

    /// Sink for checkpoint screenshots; without one checkpoints are no-ops.
    pub fn with_checkpoints(mut self, artifacts: Arc<dyn ArtifactSink>) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    pub fn with_journey_timeout(mut self, journey_timeout: Duration) -> Self {
        self.journey_timeout = journey_timeout;
        self
    }

    async fn run_step(
        &self,
        step: &JourneyStep,
        persona: &PersonaProfile,
        page: &mut PageHandle,
    ) -> StepReport {
        let mut report = StepReport::new(step.id.clone(), step.action.kind());
        let (result, elapsed_ms) =
            instrument(self.run_action_and_checks(step, persona, page, &mut report))
                .await
                .into_parts();
        report.elapsed_ms = elapsed_ms;

        match result {
            Ok(()) => report.finish(),
            Err(err) => report.with_error(&err).finish(),
        }
    }

    /// The measured span of a step: the action, then its landing checks.
    async fn run_action_and_checks(
        &self,
        step: &JourneyStep,
        persona: &PersonaProfile,
        page: &mut PageHandle,
        report: &mut StepReport,
    ) -> Result<(), ActionError> {
        let (result, action_elapsed_ms) =
            instrument(self.run_action(step, persona, page, report)).await.into_parts();
        report.action_elapsed_ms = action_elapsed_ms;
        report.page_id = Some(page.page_id().to_string());
        result?;

        for check in &step.checks {
            let (check_report, error) = self.evaluate(page, check, persona).await;
            report.checks.push(check_report);
            if let Some(err) = error {
                return Err(err);
            }
            if let CheckScope::Tolerant(deviation) = check.scope {
                if report.checks.last().map(|c| c.outcome) == Some(CheckOutcome::ToleratedMismatch) {
                    report.observe(deviation);
                }
            }
        }
        Ok(())
    }

    async fn run_action(
        &self,
        step: &JourneyStep,
        persona: &PersonaProfile,
        page: &mut PageHandle,
        report: &mut StepReport,
    ) -> Result<(), ActionError> {
        match &step.action {
            StepAction::Navigate { url } => {
                page.navigate(url).await?;
                Ok(())
            }
            StepAction::Perform(action) => self.perform(action, page, report).await,
            StepAction::Checkpoint { name } => {
                let Some(sink) = &self.artifacts else {
                    debug!(step = %step.id, "checkpoints disabled");
                    return Ok(());
                };
                match capture_checkpoint(page, sink.as_ref(), &persona.key, name).await {
                    Ok(artifact) => report.checkpoint = Some(artifact),
                    Err(err) => {
                        warn!(step = %step.id, error = %err, "checkpoint capture failed");
                        report
                            .warnings
                            .push(format!("checkpoint '{}' not captured: {}", name, err));
                    }
                }
                Ok(())
            }
        }
    }

    async fn perform(
        &self,
        action: &LogicalAction,
        page: &mut PageHandle,
        report: &mut StepReport,
    ) -> Result<(), ActionError> {
        let outcome = self.resolver.resolve(page, action).await;
        report.attempts = outcome.attempts().to_vec();
        report.succeeded_via = outcome.succeeded_via().map(str::to_string);
        let outcome = outcome.into_result(action)?;

        let Some(transition) = outcome.transition() else {
            return Ok(());
        };
        report.transition = Some(transition.kind);
        match transition.kind {
            NavigationRaceKind::NewContextOpened => {
                if let Some(opened) = transition.page.clone() {
                    info!(
                        from = %page.page_id(),
                        to = %opened.page_id(),
                        "continuing on newly opened context"
                    );
                    *page = opened;
                }
                Ok(())
            }
            NavigationRaceKind::SamePageNavigation => Ok(()),
            NavigationRaceKind::TimedOut => {
                let (pattern, timeout_ms) = action
                    .transition()
                    .map(|t| (t.url_pattern.as_str().to_string(), t.navigation_timeout_ms))
                    .unwrap_or_default();
                Err(ActionError::NavigationTimedOut { pattern, timeout_ms })
            }
        }
    }

    async fn evaluate(
        &self,
        page: &PageHandle,
        check: &Check,
        persona: &PersonaProfile,
    ) -> (CheckReport, Option<ActionError>) {
        let mut report = CheckReport {
            assertion: check.assertion.to_string(),
            scope: check.scope,
            outcome: CheckOutcome::NotApplicable,
            expected: check.assertion.expected(),
            observed: None,
            latency_ms: 0,
        };
        let applies = match check.scope {
            CheckScope::Always | CheckScope::Tolerant(_) => true,
            CheckScope::Unless(deviation) => !persona.expects(deviation),
            CheckScope::OnlyWith(deviation) => persona.expects(deviation),
        };
        if !applies {
            return (report, None);
        }

        let start = Instant::now();
        let result = self.validator.expect(page, &check.assertion).await;
        report.latency_ms = start.elapsed().as_millis() as u64;
        match result {
            Ok(gate) => {
                report.outcome = CheckOutcome::Passed;
                report.observed = Some(gate.observed);
                (report, None)
            }
            Err(err) => {
                if let ActionError::AssertionMismatch { observed, .. } = &err {
                    report.observed = Some(observed.clone());
                }
                match check.scope {
                    CheckScope::Tolerant(deviation) if persona.expects(deviation) => {
                        info!(
                            persona = %persona.key,
                            deviation = ?deviation,
                            assertion = %report.assertion,
                            "expected deviation observed"
                        );
                        report.outcome = CheckOutcome::ToleratedMismatch;
                        (report, None)
                    }
                    _ => {
                        report.outcome = CheckOutcome::Mismatch;
                        (report, Some(err))
                    }
                }
            }
        }
    }
}

#[async_trait]
impl JourneyExecutor for SessionOrchestrator {
    async fn execute(
        &self,
        journey: &Journey,
        persona: &PersonaProfile,
        page: PageHandle,
    ) -> JourneyReport {
        let session_id = SessionId::new();
        info!(
            journey = %journey.name,
            persona = %persona.key,
            session = %session_id,
            steps = journey.steps.len(),
            "starting journey"
        );

        let deadline = Instant::now() + self.journey_timeout;
        let mut page = page;
        let mut report = JourneyReport::new(&journey.name, &persona.key, session_id.to_string());
        let mut failure: Option<String> = None;
        let mut stop_at = journey.steps.len();

        for (index, step) in journey.steps.iter().enumerate() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let mut step_report = match timeout(remaining, self.run_step(step, persona, &mut page)).await {
                Ok(step_report) => step_report,
                Err(_) => {
                    let err = ActionError::Timeout(format!(
                        "journey budget of {}ms exhausted during step '{}'",
                        self.journey_timeout.as_millis(),
                        step.id
                    ));
                    let mut timed_out = StepReport::new(step.id.clone(), step.action.kind());
                    timed_out.elapsed_ms = remaining.as_millis() as u64;
                    timed_out.with_error(&err).finish()
                }
            };

            if step_report.is_failure() {
                let message = step_report
                    .error
                    .as_ref()
                    .map(|e| e.message.clone())
                    .unwrap_or_default();
                warn!(
                    journey = %journey.name,
                    persona = %persona.key,
                    step = %step.id,
                    error = %message,
                    "step failed; aborting journey"
                );
                failure = Some(format!("step '{}' failed: {}", step.id, message));
                report = report.with_step(step_report);
                stop_at = index + 1;
                break;
            }

            let ends_here = step
                .ends_journey_with
                .filter(|deviation| persona.expects(*deviation));
            if let Some(deviation) = ends_here {
                step_report.observe(deviation);
            }
            debug!(
                step = %step.id,
                status = ?step_report.status,
                elapsed_ms = step_report.elapsed_ms,
                via = step_report.succeeded_via.as_deref().unwrap_or("-"),
                "step finished"
            );
            report = report.with_step(step_report);

            if let Some(deviation) = ends_here {
                info!(
                    journey = %journey.name,
                    persona = %persona.key,
                    deviation = ?deviation,
                    "journey ended by expected deviation"
                );
                stop_at = index + 1;
                report.ended_early = stop_at < journey.steps.len();
                break;
            }
        }

        for step in &journey.steps[stop_at..] {
            report = report.with_step(StepReport::skipped(step));
        }

        let report = match failure {
            Some(error) => report.with_error(error),
            None => report.with_success(),
        }
        .finish();
        info!(
            journey = %report.journey,
            persona = %report.persona,
            success = report.success,
            latency_ms = report.latency_ms,
            "journey finished"
        );
        report
    }
}
