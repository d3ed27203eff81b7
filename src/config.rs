//! Configuration model
//!
//! Loaded from YAML by `cli::runtime::load_config`; `BASE_URL` and
//! `SAUCE_PASSWORD` in the environment override the file.

use action_flow::JourneySettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use storefront_sim::{AboutLinkMode, MarkupVersion, SimConfig, DEFAULT_BASE_URL, DEFAULT_PASSWORD};

pub const BASE_URL_ENV: &str = "BASE_URL";
pub const PASSWORD_ENV: &str = "SAUCE_PASSWORD";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub output_dir: PathBuf,
    pub timeouts: TimeoutConfig,
    pub screenshots: ScreenshotConfig,
    pub simulation: SimulationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            output_dir: PathBuf::from("./verify-output"),
            timeouts: TimeoutConfig::default(),
            screenshots: ScreenshotConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

/// All bounds in milliseconds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub presence_check_ms: u64,
    /// Per-attempt execution bound
    pub action_ms: u64,
    /// Per-candidate bound for checkout controls
    pub click_ms: u64,
    pub popup_ms: u64,
    pub navigation_ms: u64,
    /// Assertion polling bound
    pub expect_ms: u64,
    /// Failure screenshot bound
    pub capture_ms: u64,
    pub journey_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            presence_check_ms: 1_000,
            action_ms: 15_000,
            click_ms: 5_000,
            popup_ms: 3_000,
            navigation_ms: 10_000,
            expect_ms: 10_000,
            capture_ms: 10_000,
            journey_ms: 60_000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenshotConfig {
    pub on_checkpoint: bool,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            on_checkpoint: true,
        }
    }
}

/// Behavior of the in-process storefront the journeys run against.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub markup: MarkupVersion,
    pub glitch_delay_ms: u64,
    pub about_link: AboutLinkMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            markup: MarkupVersion::V1,
            glitch_delay_ms: 5_000,
            about_link: AboutLinkMode::SamePage,
        }
    }
}

impl Config {
    /// Apply environment overrides using `lookup` for variable access.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(password) = lookup(PASSWORD_ENV).filter(|v| !v.trim().is_empty()) {
            self.password = password;
        }
        self
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.output_dir.join("artifacts")
    }

    pub fn journey_settings(&self) -> JourneySettings {
        JourneySettings {
            base_url: self.base_url.clone(),
            navigation_timeout_ms: self.timeouts.navigation_ms,
            popup_timeout_ms: self.timeouts.popup_ms,
            click_timeout_ms: self.timeouts.click_ms,
        }
    }

    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            base_url: self.base_url.clone(),
            password: DEFAULT_PASSWORD.to_string(),
            ..SimConfig::default()
        }
        .with_markup(self.simulation.markup)
        .with_about_link(self.simulation.about_link)
        .with_glitch_delay(Duration::from_millis(self.simulation.glitch_delay_ms))
    }
}
