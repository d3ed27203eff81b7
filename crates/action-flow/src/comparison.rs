//! Latency comparison between two independent journey runs

use crate::errors::FlowError;
use crate::persona::PersonaProfile;
use crate::types::JourneyReport;
use serde::{Deserialize, Serialize};

/// Elapsed time of one step across a baseline and a candidate run.
///
/// Judging whether a persona is "slow" happens here, never in the
/// orchestrator or the timing wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyComparison {
    pub step_id: String,
    pub baseline: String,
    pub candidate: String,
    pub baseline_ms: u64,
    pub candidate_ms: u64,
    pub delta_ms: i64,
    pub candidate_slower: bool,
    /// Whether the delta reaches the candidate persona's expected added
    /// latency; `None` when the persona declares none
    pub meets_expected_added_latency: Option<bool>,
}

impl LatencyComparison {
    pub fn between(
        step_id: &str,
        baseline: &JourneyReport,
        candidate: &JourneyReport,
        candidate_persona: &PersonaProfile,
    ) -> Result<Self, FlowError> {
        let measure = |report: &JourneyReport| {
            report
                .step_elapsed_ms(step_id)
                .ok_or_else(|| FlowError::UnknownStep {
                    journey: format!("{} ({})", report.journey, report.persona),
                    step_id: step_id.to_string(),
                })
        };
        let baseline_ms = measure(baseline)?;
        let candidate_ms = measure(candidate)?;
        let delta_ms = candidate_ms as i64 - baseline_ms as i64;

        Ok(Self {
            step_id: step_id.to_string(),
            baseline: baseline.persona.clone(),
            candidate: candidate.persona.clone(),
            baseline_ms,
            candidate_ms,
            delta_ms,
            candidate_slower: delta_ms > 0,
            meets_expected_added_latency: candidate_persona
                .min_added_latency_ms
                .map(|min| delta_ms >= min as i64),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::find_persona;
    use crate::types::StepReport;

    fn report(persona: &str, elapsed_ms: u64) -> JourneyReport {
        let mut step = StepReport::new("submit-login", "perform");
        step.elapsed_ms = elapsed_ms;
        JourneyReport::new("login", persona, "s").with_step(step)
    }

    #[test]
    fn glitch_delta_meets_expected_latency() {
        let glitch = find_persona("performance_glitch", "pw").unwrap();
        let cmp = LatencyComparison::between(
            "submit-login",
            &report("standard", 120),
            &report("performance_glitch", 5_140),
            &glitch,
        )
        .unwrap();
        assert_eq!(cmp.delta_ms, 5_020);
        assert!(cmp.candidate_slower);
        assert_eq!(cmp.meets_expected_added_latency, Some(true));
    }

    #[test]
    fn persona_without_latency_expectation_is_not_judged() {
        let standard = find_persona("standard", "pw").unwrap();
        let cmp = LatencyComparison::between(
            "submit-login",
            &report("standard", 200),
            &report("standard", 150),
            &standard,
        )
        .unwrap();
        assert_eq!(cmp.delta_ms, -50);
        assert!(!cmp.candidate_slower);
        assert_eq!(cmp.meets_expected_added_latency, None);
    }

    #[test]
    fn missing_step_is_an_error() {
        let standard = find_persona("standard", "pw").unwrap();
        let err = LatencyComparison::between(
            "checkout",
            &report("standard", 1),
            &report("standard", 1),
            &standard,
        )
        .unwrap_err();
        assert!(matches!(err, FlowError::UnknownStep { step_id, .. } if step_id == "checkout"));
    }
}
