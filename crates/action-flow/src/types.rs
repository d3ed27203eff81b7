//! Journey definitions and execution reports

use crate::persona::Deviation;
use action_gate::Assertion;
use action_primitives::{ActionError, AttemptRecord, DiagnosticBundle, LogicalAction, NavigationRaceKind};
use chrono::{DateTime, Utc};
use page_adapter::ArtifactRef;
use serde::{Deserialize, Serialize};

/// What a journey step does to the page
#[derive(Debug, Clone)]
pub enum StepAction {
    /// Direct navigation, no candidate resolution
    Navigate { url: String },

    /// Resolve a logical action through its candidate hierarchy
    Perform(LogicalAction),

    /// Checkpoint screenshot (not a failure diagnostic)
    Checkpoint { name: String },
}

impl StepAction {
    pub fn kind(&self) -> &'static str {
        match self {
            StepAction::Navigate { .. } => "navigate",
            StepAction::Perform(_) => "perform",
            StepAction::Checkpoint { .. } => "checkpoint",
        }
    }
}

/// When a check applies, relative to the persona's expected deviations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "deviation", rename_all = "snake_case")]
pub enum CheckScope {
    Always,
    /// Skipped when the persona expects the deviation
    Unless(Deviation),
    /// Evaluated only when the persona expects the deviation
    OnlyWith(Deviation),
    /// A mismatch is an observed deviation when the persona expects it
    Tolerant(Deviation),
}

/// Assertion attached to a step
#[derive(Debug, Clone)]
pub struct Check {
    pub assertion: Assertion,
    pub scope: CheckScope,
}

impl Check {
    pub fn always(assertion: Assertion) -> Self {
        Self {
            assertion,
            scope: CheckScope::Always,
        }
    }

    pub fn unless(deviation: Deviation, assertion: Assertion) -> Self {
        Self {
            assertion,
            scope: CheckScope::Unless(deviation),
        }
    }

    pub fn only_with(deviation: Deviation, assertion: Assertion) -> Self {
        Self {
            assertion,
            scope: CheckScope::OnlyWith(deviation),
        }
    }

    pub fn tolerant(deviation: Deviation, assertion: Assertion) -> Self {
        Self {
            assertion,
            scope: CheckScope::Tolerant(deviation),
        }
    }
}

/// One step of a journey
#[derive(Debug, Clone)]
pub struct JourneyStep {
    pub id: String,
    pub action: StepAction,
    pub checks: Vec<Check>,
    /// A persona expecting this deviation ends the journey after the step
    pub ends_journey_with: Option<Deviation>,
}

impl JourneyStep {
    pub fn new(id: impl Into<String>, action: StepAction) -> Self {
        Self {
            id: id.into(),
            action,
            checks: Vec::new(),
            ends_journey_with: None,
        }
    }

    pub fn navigate(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(id, StepAction::Navigate { url: url.into() })
    }

    pub fn perform(id: impl Into<String>, action: LogicalAction) -> Self {
        Self::new(id, StepAction::Perform(action))
    }

    pub fn checkpoint(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, StepAction::Checkpoint { name: name.into() })
    }

    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub fn ending_with(mut self, deviation: Deviation) -> Self {
        self.ends_journey_with = Some(deviation);
        self
    }
}

/// Named ordered sequence of steps
#[derive(Debug, Clone)]
pub struct Journey {
    pub name: String,
    pub steps: Vec<JourneyStep>,
}

impl Journey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: JourneyStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step(&self, id: &str) -> Option<&JourneyStep> {
        self.steps.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    Failed,
    /// Completed with a deviation the persona was expected to show
    ExpectedDeviation,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    Passed,
    Mismatch,
    ToleratedMismatch,
    NotApplicable,
}

/// Result of evaluating one check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub assertion: String,
    pub scope: CheckScope,
    pub outcome: CheckOutcome,
    pub expected: String,
    pub observed: Option<String>,
    pub latency_ms: u64,
}

/// Error summary carried in reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub kind: String,
    pub message: String,
}

impl From<&ActionError> for ErrorSummary {
    fn from(err: &ActionError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Step execution result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub step_id: String,

    /// Step type
    pub step_type: String,

    pub status: StepStatus,

    /// Selector of the candidate that succeeded
    pub succeeded_via: Option<String>,

    pub attempts: Vec<AttemptRecord>,

    pub transition: Option<NavigationRaceKind>,

    /// Page the step finished on
    pub page_id: Option<String>,

    /// Time spent in the action itself
    pub action_elapsed_ms: u64,

    /// Action plus checks, measured with `instrument`
    pub elapsed_ms: u64,

    pub checks: Vec<CheckReport>,

    pub observed_deviations: Vec<Deviation>,

    pub error: Option<ErrorSummary>,

    pub diagnostics: Option<DiagnosticBundle>,

    pub warnings: Vec<String>,

    pub checkpoint: Option<ArtifactRef>,

    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,
}

impl StepReport {
    /// Create a new step report
    pub fn new(step_id: impl Into<String>, step_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            step_id: step_id.into(),
            step_type: step_type.into(),
            status: StepStatus::Passed,
            succeeded_via: None,
            attempts: Vec::new(),
            transition: None,
            page_id: None,
            action_elapsed_ms: 0,
            elapsed_ms: 0,
            checks: Vec::new(),
            observed_deviations: Vec::new(),
            error: None,
            diagnostics: None,
            warnings: Vec::new(),
            checkpoint: None,
            started_at: now,
            finished_at: now,
        }
    }

    /// Report for a step that never ran
    pub fn skipped(step: &JourneyStep) -> Self {
        let mut report = Self::new(step.id.clone(), step.action.kind());
        report.status = StepStatus::Skipped;
        report
    }

    /// Mark as failure
    pub fn with_error(mut self, error: &ActionError) -> Self {
        self.status = StepStatus::Failed;
        self.error = Some(ErrorSummary::from(error));
        if let ActionError::StrategyExhausted {
            attempts,
            diagnostics_ref,
            warnings,
            ..
        } = error
        {
            self.attempts = attempts.clone();
            self.diagnostics = diagnostics_ref.clone();
            self.warnings.extend(warnings.iter().cloned());
        }
        self
    }

    pub fn observe(&mut self, deviation: Deviation) {
        if !self.observed_deviations.contains(&deviation) {
            self.observed_deviations.push(deviation);
        }
        if self.status == StepStatus::Passed {
            self.status = StepStatus::ExpectedDeviation;
        }
    }

    /// Set finish time; `elapsed_ms` is left as measured
    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    pub fn is_failure(&self) -> bool {
        self.status == StepStatus::Failed
    }
}

/// Journey execution result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyReport {
    pub journey: String,

    /// Persona key
    pub persona: String,

    pub session_id: String,

    /// Overall success
    pub success: bool,

    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,

    /// Total latency in milliseconds
    pub latency_ms: u64,

    pub steps: Vec<StepReport>,

    pub observed_deviations: Vec<Deviation>,

    /// Ended by an expected deviation before the last step
    pub ended_early: bool,

    /// Error message if failed
    pub error: Option<String>,
}

impl JourneyReport {
    pub fn new(journey: impl Into<String>, persona: impl Into<String>, session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            journey: journey.into(),
            persona: persona.into(),
            session_id: session_id.into(),
            success: false,
            started_at: now,
            finished_at: now,
            latency_ms: 0,
            steps: Vec::new(),
            observed_deviations: Vec::new(),
            ended_early: false,
            error: None,
        }
    }

    /// Mark as success
    pub fn with_success(mut self) -> Self {
        self.success = true;
        self.error = None;
        self
    }

    /// Mark as failure
    pub fn with_error(mut self, error: String) -> Self {
        self.success = false;
        self.error = Some(error);
        self
    }

    pub fn with_step(mut self, step: StepReport) -> Self {
        for deviation in &step.observed_deviations {
            if !self.observed_deviations.contains(deviation) {
                self.observed_deviations.push(*deviation);
            }
        }
        self.steps.push(step);
        self
    }

    /// Set finish time and calculate latency
    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self.latency_ms = (self.finished_at - self.started_at).num_milliseconds().max(0) as u64;
        self
    }

    pub fn step(&self, step_id: &str) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }

    /// Elapsed time of a step that actually ran
    pub fn step_elapsed_ms(&self, step_id: &str) -> Option<u64> {
        self.step(step_id)
            .filter(|s| s.status != StepStatus::Skipped)
            .map(|s| s.elapsed_ms)
    }

    pub fn failed_step(&self) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.is_failure())
    }

    pub fn observed(&self, deviation: Deviation) -> bool {
        self.observed_deviations.contains(&deviation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observing_a_deviation_upgrades_passed_status_once() {
        let mut report = StepReport::new("sort", "perform");
        report.observe(Deviation::UnreliableSorting);
        report.observe(Deviation::UnreliableSorting);
        assert_eq!(report.status, StepStatus::ExpectedDeviation);
        assert_eq!(report.observed_deviations, vec![Deviation::UnreliableSorting]);
    }

    #[test]
    fn exhausted_error_carries_attempts_and_warnings() {
        let err = ActionError::StrategyExhausted {
            action: "checkout".into(),
            attempts: vec![AttemptRecord {
                selector: "#checkout".into(),
                result: action_primitives::StrategyResult::NotPresent,
                elapsed_ms: 3,
            }],
            diagnostics_ref: None,
            warnings: vec!["diagnostics capture failed: gone".into()],
        };
        let report = StepReport::new("checkout", "perform").with_error(&err).finish();
        assert!(report.is_failure());
        assert_eq!(report.attempts.len(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.error.as_ref().map(|e| e.kind.as_str()), Some("strategy_exhausted"));
    }

    #[test]
    fn journey_aggregates_deviations_and_ignores_skipped_latency() {
        let mut deviating = StepReport::new("sort", "perform");
        deviating.observe(Deviation::UnreliableSorting);
        let step = JourneyStep::navigate("open", "about:blank");
        let report = JourneyReport::new("purchase", "problem", "s-1")
            .with_step(deviating.finish())
            .with_step(StepReport::skipped(&step));
        assert!(report.observed(Deviation::UnreliableSorting));
        assert_eq!(report.step_elapsed_ms("open"), None);
        assert!(report.step_elapsed_ms("sort").is_some());
    }
}
