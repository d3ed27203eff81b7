//! Synthetic user personas and their expected deviations

use serde::{Deserialize, Serialize};

/// Behavior a persona is expected to show instead of the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deviation {
    /// Login is refused and the session stays on the login page
    LoginRejected,
    /// Product ordering ignores the selected sort
    UnreliableSorting,
    /// Form inputs do not keep what was typed
    UnreliableFormInput,
    /// Interactions are measurably slower
    AddedLatency,
}

/// A named synthetic user with the deviations its journeys should show.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaProfile {
    pub key: String,
    pub username: String,
    #[serde(skip)]
    pub password: String,
    pub description: String,
    pub deviations: Vec<Deviation>,
    /// Lower bound on the latency this persona adds over the baseline
    pub min_added_latency_ms: Option<u64>,
}

impl PersonaProfile {
    pub fn new(key: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            username: username.into(),
            password: password.into(),
            description: String::new(),
            deviations: Vec::new(),
            min_added_latency_ms: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn deviating(mut self, deviation: Deviation) -> Self {
        if !self.deviations.contains(&deviation) {
            self.deviations.push(deviation);
        }
        self
    }

    pub fn with_added_latency(mut self, min_ms: u64) -> Self {
        self.min_added_latency_ms = Some(min_ms);
        self.deviating(Deviation::AddedLatency)
    }

    pub fn expects(&self, deviation: Deviation) -> bool {
        self.deviations.contains(&deviation)
    }
}

/// Built-in persona catalog in run order.
pub fn builtin_personas(password: &str) -> Vec<PersonaProfile> {
    vec![
        PersonaProfile::new("standard", "standard_user", password)
            .describe("Baseline user with no induced faults"),
        PersonaProfile::new("locked_out", "locked_out_user", password)
            .describe("Account is locked; login must be refused")
            .deviating(Deviation::LoginRejected),
        PersonaProfile::new("problem", "problem_user", password)
            .describe("UI-impaired user: broken sorting and form input")
            .deviating(Deviation::UnreliableSorting)
            .deviating(Deviation::UnreliableFormInput),
        PersonaProfile::new("performance_glitch", "performance_glitch_user", password)
            .describe("Latency-impaired user")
            .with_added_latency(3000),
    ]
}

pub fn find_persona(key: &str, password: &str) -> Option<PersonaProfile> {
    builtin_personas(password).into_iter().find(|p| p.key == key)
}
