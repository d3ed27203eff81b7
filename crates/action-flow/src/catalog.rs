//! Built-in journeys against the demo storefront

use crate::errors::FlowError;
use crate::persona::{Deviation, PersonaProfile};
use crate::types::{Check, Journey, JourneyStep};
use action_gate::{Assertion, SortOrder};
use action_primitives::{CandidateStrategy, LogicalAction, TransitionExpectation, UrlPattern};
use serde::{Deserialize, Serialize};

pub const PURCHASE: &str = "purchase";
pub const LOGIN: &str = "login";
pub const ABOUT: &str = "about";
pub const LOGOUT: &str = "logout";

/// Journey names in catalog order.
pub const JOURNEYS: [&str; 4] = [PURCHASE, LOGIN, ABOUT, LOGOUT];

pub const LOCKED_OUT_MESSAGE: &str = "this user has been locked out";
pub const ORDER_COMPLETE_HEADER: &str = "THANK YOU FOR YOUR ORDER";

/// Target and timing knobs baked into journey definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneySettings {
    pub base_url: String,
    pub navigation_timeout_ms: u64,
    pub popup_timeout_ms: u64,
    /// Per-candidate bound for checkout controls
    pub click_timeout_ms: u64,
}

impl Default for JourneySettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.saucedemo.com/v1/index.html".to_string(),
            navigation_timeout_ms: 10_000,
            popup_timeout_ms: 3_000,
            click_timeout_ms: 5_000,
        }
    }
}

/// Builds named journeys for a persona.
#[derive(Debug, Clone, Default)]
pub struct JourneyCatalog {
    settings: JourneySettings,
}

impl JourneyCatalog {
    pub fn new(settings: JourneySettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &JourneySettings {
        &self.settings
    }

    pub fn by_name(&self, name: &str, persona: &PersonaProfile) -> Result<Journey, FlowError> {
        match name {
            PURCHASE => self.purchase(persona),
            LOGIN => self.login(persona),
            ABOUT => self.about(persona),
            LOGOUT => self.logout(persona),
            other => Err(FlowError::UnknownJourney(other.to_string())),
        }
    }

    pub fn login(&self, persona: &PersonaProfile) -> Result<Journey, FlowError> {
        self.with_login(Journey::new(LOGIN), persona)
    }

    pub fn purchase(&self, persona: &PersonaProfile) -> Result<Journey, FlowError> {
        let journey = self
            .with_login(Journey::new(PURCHASE), persona)?
            .with_step(
                JourneyStep::perform(
                    "sort-by-price",
                    LogicalAction::select(
                        "sort products by price (low to high)",
                        [".product_sort_container", "select.product_sort_container"],
                        "lohi",
                    )?,
                )
                .with_check(Check::tolerant(
                    Deviation::UnreliableSorting,
                    Assertion::sorted_by(".inventory_item_price", SortOrder::PriceAsc),
                )),
            )
            .with_step(
                JourneyStep::perform(
                    "add-first-item",
                    LogicalAction::click(
                        "add first listed item to cart",
                        [".inventory_item button", ".btn_inventory", "button:has-text(\"Add to cart\")"],
                    )?,
                )
                .with_check(Check::always(Assertion::text_contains(".shopping_cart_badge", "1"))),
            )
            .with_step(
                JourneyStep::perform(
                    "open-cart",
                    LogicalAction::click(
                        "open shopping cart",
                        [".shopping_cart_link", "#shopping_cart_container a"],
                    )?
                    .expecting(self.same_page("cart.html")),
                )
                .with_check(Check::always(Assertion::count_equals(".cart_item", 1))),
            )
            .with_step(JourneyStep::perform(
                "checkout",
                self.hierarchy(
                    "activate checkout",
                    &[
                        "button[data-test=\"checkout\"]",
                        "button#checkout",
                        "button:has-text(\"Checkout\")",
                        "text=Checkout",
                        "a:has-text(\"Checkout\")",
                        "input[value=\"Checkout\"]",
                    ],
                    "checkout-step-one.html",
                )?,
            ))
            .with_step(
                JourneyStep::perform(
                    "fill-first-name",
                    LogicalAction::fill(
                        "enter first name",
                        ["[data-test=\"firstName\"]", "#first-name"],
                        "Test",
                    )?,
                )
                .with_check(Check::always(Assertion::input_value_equals(
                    "[data-test=\"firstName\"]",
                    "Test",
                ))),
            )
            .with_step(
                JourneyStep::perform(
                    "fill-last-name",
                    LogicalAction::fill(
                        "enter last name",
                        ["[data-test=\"lastName\"]", "#last-name"],
                        "User",
                    )?,
                )
                .with_check(Check::tolerant(
                    Deviation::UnreliableFormInput,
                    Assertion::input_value_equals("[data-test=\"lastName\"]", "User"),
                ))
                .ending_with(Deviation::UnreliableFormInput),
            )
            .with_step(JourneyStep::perform(
                "fill-postal-code",
                LogicalAction::fill(
                    "enter postal code",
                    ["[data-test=\"postalCode\"]", "#postal-code"],
                    "12345",
                )?,
            ))
            .with_step(
                JourneyStep::perform(
                    "continue",
                    self.hierarchy(
                        "continue to overview",
                        &[
                            "button[data-test=\"continue\"]",
                            "button#continue",
                            "button:has-text(\"Continue\")",
                            "text=Continue",
                            "input[value=\"Continue\"]",
                        ],
                        "checkout-step-two.html",
                    )?,
                )
                .with_check(Check::always(Assertion::visible(".summary_total_label"))),
            )
            .with_step(JourneyStep::checkpoint("overview-checkpoint", "checkout-overview"))
            .with_step(
                JourneyStep::perform(
                    "finish",
                    self.hierarchy(
                        "finish order",
                        &[
                            "button[data-test=\"finish\"]",
                            "button#finish",
                            "button:has-text(\"Finish\")",
                            "text=Finish",
                            "input[value=\"Finish\"]",
                        ],
                        "checkout-complete.html",
                    )?,
                )
                .with_check(Check::always(Assertion::text_contains(
                    ".complete-header",
                    ORDER_COMPLETE_HEADER,
                ))),
            )
            .with_step(JourneyStep::checkpoint("complete-checkpoint", "checkout-complete"));
        Ok(journey)
    }

    pub fn about(&self, persona: &PersonaProfile) -> Result<Journey, FlowError> {
        let s = &self.settings;
        Ok(self
            .with_login(Journey::new(ABOUT), persona)?
            .with_step(self.open_menu()?)
            .with_step(
                JourneyStep::perform(
                    "open-about",
                    LogicalAction::click(
                        "open About link",
                        ["#about_sidebar_link", "a:has-text(\"About\")", "text=About"],
                    )?
                    .expecting(TransitionExpectation::new(
                        UrlPattern::contains("saucelabs.com"),
                        Some(s.popup_timeout_ms),
                        s.navigation_timeout_ms,
                    )),
                )
                .with_check(Check::always(Assertion::visible("h1"))),
            ))
    }

    pub fn logout(&self, persona: &PersonaProfile) -> Result<Journey, FlowError> {
        Ok(self
            .with_login(Journey::new(LOGOUT), persona)?
            .with_step(self.open_menu()?)
            .with_step(
                JourneyStep::perform(
                    "logout",
                    LogicalAction::click("log out", ["#logout_sidebar_link", "text=Logout"])?
                        .expecting(self.same_page("index.html")),
                )
                .with_check(Check::always(Assertion::visible("#login-button"))),
            ))
    }

    fn with_login(&self, journey: Journey, persona: &PersonaProfile) -> Result<Journey, FlowError> {
        let login_page = UrlPattern::regex(r"(/|/index\.html)$")?;
        Ok(journey
            .with_step(
                JourneyStep::navigate("open-login", &self.settings.base_url)
                    .with_check(Check::always(Assertion::visible("#login-button"))),
            )
            .with_step(JourneyStep::perform(
                "fill-username",
                LogicalAction::fill(
                    "enter username",
                    ["#user-name", "[data-test=\"username\"]"],
                    persona.username.clone(),
                )?,
            ))
            .with_step(JourneyStep::perform(
                "fill-password",
                LogicalAction::fill(
                    "enter password",
                    ["#password", "[data-test=\"password\"]"],
                    persona.password.clone(),
                )?,
            ))
            .with_step(
                JourneyStep::perform(
                    "submit-login",
                    LogicalAction::click(
                        "submit login",
                        ["#login-button", "input[value=\"LOGIN\"]", "[data-test=\"login-button\"]"],
                    )?,
                )
                .with_check(Check::unless(
                    Deviation::LoginRejected,
                    Assertion::url_matches(UrlPattern::contains("inventory.html")),
                ))
                .with_check(Check::unless(
                    Deviation::LoginRejected,
                    Assertion::visible(".inventory_list"),
                ))
                .with_check(Check::only_with(
                    Deviation::LoginRejected,
                    Assertion::text_contains("[data-test=\"error\"]", LOCKED_OUT_MESSAGE),
                ))
                .with_check(Check::only_with(
                    Deviation::LoginRejected,
                    Assertion::url_matches(login_page),
                ))
                .ending_with(Deviation::LoginRejected),
            ))
    }

    fn open_menu(&self) -> Result<JourneyStep, FlowError> {
        Ok(JourneyStep::perform(
            "open-menu",
            LogicalAction::click(
                "open side menu",
                [".bm-burger-button button", ".bm-burger-button", "button:has-text(\"Open Menu\")"],
            )?,
        )
        .with_check(Check::always(Assertion::visible("#about_sidebar_link"))))
    }

    fn same_page(&self, fragment: &str) -> TransitionExpectation {
        TransitionExpectation::same_page(
            UrlPattern::contains(fragment),
            self.settings.navigation_timeout_ms,
        )
    }

    /// Click through an ordered selector hierarchy with a bounded attempt each.
    fn hierarchy(
        &self,
        description: &str,
        selectors: &[&str],
        destination: &str,
    ) -> Result<LogicalAction, FlowError> {
        let candidates = selectors
            .iter()
            .map(|s| CandidateStrategy::new(*s).with_timeout(self.settings.click_timeout_ms));
        Ok(LogicalAction::click(description, candidates)?.expecting(self.same_page(destination)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::find_persona;

    fn catalog() -> JourneyCatalog {
        JourneyCatalog::default()
    }

    #[test]
    fn purchase_steps_are_in_order() {
        let persona = find_persona("standard", "pw").unwrap();
        let journey = catalog().purchase(&persona).unwrap();
        let ids: Vec<&str> = journey.steps.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "open-login",
                "fill-username",
                "fill-password",
                "submit-login",
                "sort-by-price",
                "add-first-item",
                "open-cart",
                "checkout",
                "fill-first-name",
                "fill-last-name",
                "fill-postal-code",
                "continue",
                "overview-checkpoint",
                "finish",
                "complete-checkpoint",
            ]
        );
    }

    #[test]
    fn checkout_hierarchy_is_bounded_per_candidate() {
        let persona = find_persona("standard", "pw").unwrap();
        let journey = catalog().purchase(&persona).unwrap();
        let step = journey.step("checkout").unwrap();
        let crate::types::StepAction::Perform(action) = &step.action else {
            panic!("checkout should perform an action");
        };
        assert_eq!(action.candidates().len(), 6);
        assert!(action.candidates().iter().all(|c| c.timeout_ms == Some(5_000)));
        assert!(action
            .transition()
            .unwrap()
            .url_pattern
            .is_match("https://www.saucedemo.com/v1/checkout-step-one.html"));
    }

    #[test]
    fn login_uses_persona_credentials_and_ends_on_rejection() {
        let persona = find_persona("locked_out", "secret").unwrap();
        let journey = catalog().login(&persona).unwrap();
        let crate::types::StepAction::Perform(action) = &journey.step("fill-username").unwrap().action else {
            panic!("fill-username should perform an action");
        };
        assert_eq!(
            action.interaction(),
            &action_primitives::Interaction::Fill("locked_out_user".into())
        );
        let submit = journey.step("submit-login").unwrap();
        assert_eq!(submit.ends_journey_with, Some(Deviation::LoginRejected));
        assert!(submit.checks.len() >= 4);
    }

    #[test]
    fn unknown_journey_is_rejected() {
        let persona = find_persona("standard", "pw").unwrap();
        assert!(matches!(
            catalog().by_name("refund", &persona),
            Err(FlowError::UnknownJourney(name)) if name == "refund"
        ));
    }

    #[test]
    fn about_races_popup_against_same_page() {
        let persona = find_persona("standard", "pw").unwrap();
        let journey = catalog().about(&persona).unwrap();
        let crate::types::StepAction::Perform(action) = &journey.step("open-about").unwrap().action else {
            panic!("open-about should perform an action");
        };
        assert_eq!(action.transition().unwrap().popup_timeout_ms, Some(3_000));
    }
}
