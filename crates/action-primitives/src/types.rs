//! Core data types for action resolution

use crate::errors::ActionError;
use crate::pattern::UrlPattern;
use chrono::{DateTime, Utc};
use page_adapter::{ArtifactRef, PageHandle};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One concrete way to locate the target of a logical action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateStrategy {
    /// Opaque selector descriptor passed to the page driver
    pub selector: String,

    /// Per-attempt execution bound; the resolver default applies when unset
    pub timeout_ms: Option<u64>,
}

impl CandidateStrategy {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            timeout_ms: None,
        }
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

impl From<&str> for CandidateStrategy {
    fn from(selector: &str) -> Self {
        Self::new(selector)
    }
}

impl fmt::Display for CandidateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.selector)
    }
}

/// What to do with the element once a candidate locates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Interaction {
    Click,
    Fill(String),
    SelectOption(String),
}

impl Interaction {
    pub fn name(&self) -> &'static str {
        match self {
            Interaction::Click => "click",
            Interaction::Fill(_) => "fill",
            Interaction::SelectOption(_) => "select_option",
        }
    }
}

/// Page transition the action is expected to cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionExpectation {
    pub url_pattern: UrlPattern,

    /// Bound on the new-context branch; `None` disables it
    pub popup_timeout_ms: Option<u64>,

    pub navigation_timeout_ms: u64,
}

impl TransitionExpectation {
    pub fn new(url_pattern: UrlPattern, popup_timeout_ms: Option<u64>, navigation_timeout_ms: u64) -> Self {
        Self {
            url_pattern,
            popup_timeout_ms,
            navigation_timeout_ms,
        }
    }

    /// Same-page navigation only.
    pub fn same_page(url_pattern: UrlPattern, navigation_timeout_ms: u64) -> Self {
        Self::new(url_pattern, None, navigation_timeout_ms)
    }
}

/// A named intent with its ordered fallback candidates.
///
/// Construction rejects an empty candidate list, so every value of this type
/// has at least one candidate.
#[derive(Debug, Clone, Serialize)]
pub struct LogicalAction {
    description: String,
    interaction: Interaction,
    candidates: Vec<CandidateStrategy>,
    transition: Option<TransitionExpectation>,
}

impl LogicalAction {
    pub fn new<I, C>(
        description: impl Into<String>,
        interaction: Interaction,
        candidates: I,
    ) -> Result<Self, ActionError>
    where
        I: IntoIterator<Item = C>,
        C: Into<CandidateStrategy>,
    {
        let description = description.into();
        let candidates: Vec<CandidateStrategy> = candidates.into_iter().map(Into::into).collect();
        if candidates.is_empty() {
            return Err(ActionError::InvalidAction(format!(
                "'{}' declares no candidate strategies",
                description
            )));
        }
        Ok(Self {
            description,
            interaction,
            candidates,
            transition: None,
        })
    }

    pub fn click<I, C>(description: impl Into<String>, candidates: I) -> Result<Self, ActionError>
    where
        I: IntoIterator<Item = C>,
        C: Into<CandidateStrategy>,
    {
        Self::new(description, Interaction::Click, candidates)
    }

    pub fn fill<I, C>(
        description: impl Into<String>,
        candidates: I,
        text: impl Into<String>,
    ) -> Result<Self, ActionError>
    where
        I: IntoIterator<Item = C>,
        C: Into<CandidateStrategy>,
    {
        Self::new(description, Interaction::Fill(text.into()), candidates)
    }

    pub fn select<I, C>(
        description: impl Into<String>,
        candidates: I,
        value: impl Into<String>,
    ) -> Result<Self, ActionError>
    where
        I: IntoIterator<Item = C>,
        C: Into<CandidateStrategy>,
    {
        Self::new(description, Interaction::SelectOption(value.into()), candidates)
    }

    pub fn expecting(mut self, transition: TransitionExpectation) -> Self {
        self.transition = Some(transition);
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn candidates(&self) -> &[CandidateStrategy] {
        &self.candidates
    }

    pub fn transition(&self) -> Option<&TransitionExpectation> {
        self.transition.as_ref()
    }
}

/// Outcome of one candidate attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StrategyResult {
    NotPresent,
    ExecutedSuccessfully,
    PresentButExecutionFailed { reason: String },
}

impl StrategyResult {
    pub fn is_success(&self) -> bool {
        matches!(self, StrategyResult::ExecutedSuccessfully)
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            StrategyResult::NotPresent => Some("not present"),
            StrategyResult::ExecutedSuccessfully => None,
            StrategyResult::PresentButExecutionFailed { reason } => Some(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub selector: String,
    #[serde(flatten)]
    pub result: StrategyResult,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationRaceKind {
    SamePageNavigation,
    NewContextOpened,
    TimedOut,
}

/// Result of racing a popup against same-page navigation.
#[derive(Clone, Serialize, Deserialize)]
pub struct NavigationRaceOutcome {
    pub kind: NavigationRaceKind,

    /// Page that won the race; `None` on timeout
    #[serde(skip)]
    pub page: Option<PageHandle>,

    pub matched_url_pattern: Option<String>,

    pub elapsed_ms: u64,
}

impl NavigationRaceOutcome {
    pub fn timed_out(elapsed_ms: u64) -> Self {
        Self {
            kind: NavigationRaceKind::TimedOut,
            page: None,
            matched_url_pattern: None,
            elapsed_ms,
        }
    }

    pub fn is_timed_out(&self) -> bool {
        self.kind == NavigationRaceKind::TimedOut
    }
}

impl fmt::Debug for NavigationRaceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationRaceOutcome")
            .field("kind", &self.kind)
            .field("page", &self.page.as_ref().map(|page| page.page_id()))
            .field("matched_url_pattern", &self.matched_url_pattern)
            .field("elapsed_ms", &self.elapsed_ms)
            .finish()
    }
}

/// Artifact produced when every candidate of an action failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticBundle {
    pub artifact_name: String,
    pub label: String,
    pub screenshot: ArtifactRef,
    pub associated_action_description: String,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate result of resolving one logical action
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionOutcome {
    Succeeded {
        succeeded_via: String,
        elapsed_ms: u64,
        attempts: Vec<AttemptRecord>,
        transition: Option<NavigationRaceOutcome>,
    },
    StrategyExhausted {
        attempts: Vec<AttemptRecord>,
        diagnostics_ref: Option<DiagnosticBundle>,
        warnings: Vec<String>,
        elapsed_ms: u64,
    },
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Succeeded { .. })
    }

    pub fn succeeded_via(&self) -> Option<&str> {
        match self {
            ActionOutcome::Succeeded { succeeded_via, .. } => Some(succeeded_via),
            ActionOutcome::StrategyExhausted { .. } => None,
        }
    }

    pub fn attempts(&self) -> &[AttemptRecord] {
        match self {
            ActionOutcome::Succeeded { attempts, .. }
            | ActionOutcome::StrategyExhausted { attempts, .. } => attempts,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        match self {
            ActionOutcome::Succeeded { elapsed_ms, .. }
            | ActionOutcome::StrategyExhausted { elapsed_ms, .. } => *elapsed_ms,
        }
    }

    pub fn transition(&self) -> Option<&NavigationRaceOutcome> {
        match self {
            ActionOutcome::Succeeded { transition, .. } => transition.as_ref(),
            ActionOutcome::StrategyExhausted { .. } => None,
        }
    }

    /// Convert an exhaustion into the matching [`ActionError`].
    pub fn into_result(self, action: &LogicalAction) -> Result<ActionOutcome, ActionError> {
        match self {
            ActionOutcome::StrategyExhausted {
                attempts,
                diagnostics_ref,
                warnings,
                ..
            } => Err(ActionError::StrategyExhausted {
                action: action.description().to_string(),
                attempts,
                diagnostics_ref,
                warnings,
            }),
            succeeded => Ok(succeeded),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_candidate_list_is_rejected() {
        let err = LogicalAction::click("activate checkout control", Vec::<&str>::new()).unwrap_err();
        assert!(matches!(err, ActionError::InvalidAction(_)));
    }

    #[test]
    fn candidate_order_is_preserved() {
        let action =
            LogicalAction::click("activate checkout control", ["#checkout-button", "a.checkout_button"])
                .unwrap();
        let selectors: Vec<&str> = action.candidates().iter().map(|c| c.selector.as_str()).collect();
        assert_eq!(selectors, vec!["#checkout-button", "a.checkout_button"]);
    }

    #[test]
    fn attempt_record_serializes_flat() {
        let record = AttemptRecord {
            selector: "#continue".to_string(),
            result: StrategyResult::PresentButExecutionFailed {
                reason: "covered".to_string(),
            },
            elapsed_ms: 12,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["result"], "present_but_execution_failed");
        assert_eq!(value["reason"], "covered");
        assert_eq!(value["selector"], "#continue");
    }

    #[test]
    fn exhausted_outcome_converts_to_error() {
        let action = LogicalAction::click("finish order", ["#finish"]).unwrap();
        let outcome = ActionOutcome::StrategyExhausted {
            attempts: vec![AttemptRecord {
                selector: "#finish".to_string(),
                result: StrategyResult::NotPresent,
                elapsed_ms: 1,
            }],
            diagnostics_ref: None,
            warnings: vec!["capture skipped".to_string()],
            elapsed_ms: 1,
        };
        match outcome.into_result(&action) {
            Err(ActionError::StrategyExhausted {
                action, warnings, ..
            }) => {
                assert_eq!(action, "finish order");
                assert_eq!(warnings.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
