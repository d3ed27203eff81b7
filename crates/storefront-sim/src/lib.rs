//! In-process model of the demo storefront.
//!
//! [`SimBrowser`] hands out isolated sessions whose pages implement
//! [`page_adapter::PageDriver`]. Each session owns its own cart and login
//! state; pages opened from a session (popups) share it.

pub mod catalog;
pub mod dom;
mod page;

pub use catalog::{
    Account, Product, SortKey, LOCKED_OUT_USER, PERFORMANCE_GLITCH_USER, PROBLEM_USER, PRODUCTS,
    STANDARD_USER,
};
pub use dom::ABOUT_URL;
pub use page::SimPage;

use page::Session;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com/v1/index.html";
pub const DEFAULT_PASSWORD: &str = "secret_sauce";

/// Which generation of storefront markup to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupVersion {
    #[default]
    V1,
    V2,
}

/// How the menu's About link behaves when activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AboutLinkMode {
    #[default]
    SamePage,
    Popup,
    /// The link does nothing.
    Inert,
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub base_url: String,
    pub password: String,
    pub markup: MarkupVersion,
    /// Delay before the performance-glitch account lands on the inventory.
    pub glitch_delay: Duration,
    pub about_link: AboutLinkMode,
    /// Per-selector click latency.
    pub click_delays: HashMap<String, Duration>,
    /// Selectors that are present but reject clicks.
    pub broken_selectors: Vec<String>,
    pub fail_screenshots: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            markup: MarkupVersion::V1,
            glitch_delay: Duration::from_millis(5000),
            about_link: AboutLinkMode::SamePage,
            click_delays: HashMap::new(),
            broken_selectors: Vec::new(),
            fail_screenshots: false,
        }
    }
}

impl SimConfig {
    pub fn with_markup(mut self, markup: MarkupVersion) -> Self {
        self.markup = markup;
        self
    }

    pub fn with_about_link(mut self, mode: AboutLinkMode) -> Self {
        self.about_link = mode;
        self
    }

    pub fn with_glitch_delay(mut self, delay: Duration) -> Self {
        self.glitch_delay = delay;
        self
    }

    pub fn with_click_delay(mut self, selector: impl Into<String>, delay: Duration) -> Self {
        self.click_delays.insert(selector.into(), delay);
        self
    }

    pub fn with_broken_selector(mut self, selector: impl Into<String>) -> Self {
        self.broken_selectors.push(selector.into());
        self
    }

    pub fn with_failing_screenshots(mut self) -> Self {
        self.fail_screenshots = true;
        self
    }
}

/// Factory for isolated simulated sessions.
#[derive(Clone)]
pub struct SimBrowser {
    config: Arc<SimConfig>,
}

impl SimBrowser {
    pub fn launch(config: SimConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Open a fresh session with an empty cart and a blank page.
    pub fn new_context(&self) -> Arc<SimPage> {
        Arc::new(SimPage::open(Session::new(self.config.clone()), "about:blank"))
    }
}
