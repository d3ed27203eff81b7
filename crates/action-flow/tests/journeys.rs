use action_diagnostics::{DiagnosticsCapture, MemoryArtifactSink};
use action_flow::{
    find_persona, Deviation, JourneyCatalog, JourneyExecutor, JourneyReport, JourneySettings,
    LatencyComparison, PersonaProfile, SessionOrchestrator, StepStatus,
};
use action_gate::PollingValidator;
use action_locator::{LocatorStrategyResolver, ResolverConfig};
use action_primitives::{NavigationRaceCoordinator, NavigationRaceKind};
use page_adapter::PageHandle;
use std::sync::Arc;
use std::time::Duration;
use storefront_core_types::ScenarioId;
use storefront_sim::{
    AboutLinkMode, MarkupVersion, SimBrowser, SimConfig, DEFAULT_BASE_URL, DEFAULT_PASSWORD,
};

struct Harness {
    browser: SimBrowser,
    sink: Arc<MemoryArtifactSink>,
    diagnostics: Arc<DiagnosticsCapture>,
    orchestrator: SessionOrchestrator,
    catalog: JourneyCatalog,
}

impl Harness {
    fn new(config: SimConfig) -> Self {
        Self::with_budget(config, Duration::from_secs(20))
    }

    fn with_budget(config: SimConfig, journey_timeout: Duration) -> Self {
        let sink = Arc::new(MemoryArtifactSink::new());
        let diagnostics = Arc::new(DiagnosticsCapture::new(
            sink.clone(),
            ScenarioId::parse("journey test").unwrap(),
        ));
        let resolver = LocatorStrategyResolver::new(ResolverConfig {
            presence_check_ms: 200,
            action_ms: 1_000,
            capture_ms: 1_000,
        })
        .with_diagnostics(diagnostics.clone())
        .with_navigation(NavigationRaceCoordinator::new(Duration::from_millis(20)));
        let validator =
            PollingValidator::new(Duration::from_millis(1_000)).with_poll_interval(Duration::from_millis(20));
        let orchestrator = SessionOrchestrator::new(Arc::new(resolver), Arc::new(validator))
            .with_checkpoints(sink.clone())
            .with_journey_timeout(journey_timeout);
        let catalog = JourneyCatalog::new(JourneySettings {
            base_url: DEFAULT_BASE_URL.to_string(),
            navigation_timeout_ms: 800,
            popup_timeout_ms: 300,
            click_timeout_ms: 500,
        });
        Self {
            browser: SimBrowser::launch(config),
            sink,
            diagnostics,
            orchestrator,
            catalog,
        }
    }

    async fn run(&self, journey: &str, persona: &PersonaProfile) -> JourneyReport {
        let journey = self.catalog.by_name(journey, persona).unwrap();
        let page: PageHandle = self.browser.new_context();
        self.orchestrator.execute(&journey, persona, page).await
    }
}

fn persona(key: &str) -> PersonaProfile {
    find_persona(key, DEFAULT_PASSWORD).unwrap()
}

fn fast_glitch() -> SimConfig {
    SimConfig::default().with_glitch_delay(Duration::from_millis(400))
}

#[tokio::test]
async fn standard_purchase_completes_on_legacy_markup() {
    let harness = Harness::new(SimConfig::default());
    let report = harness.run("purchase", &persona("standard")).await;

    assert!(report.success, "{:?}", report.error);
    assert!(!report.ended_early);
    assert!(report.steps.iter().all(|s| s.status == StepStatus::Passed));
    assert_eq!(
        report.step("checkout").unwrap().succeeded_via.as_deref(),
        Some("text=Checkout")
    );
    assert_eq!(
        report.step("finish").unwrap().transition,
        Some(NavigationRaceKind::SamePageNavigation)
    );
}

#[tokio::test]
async fn current_markup_resolves_on_first_candidate() {
    let harness = Harness::new(SimConfig::default().with_markup(MarkupVersion::V2));
    let report = harness.run("purchase", &persona("standard")).await;

    assert!(report.success, "{:?}", report.error);
    let checkout = report.step("checkout").unwrap();
    assert_eq!(checkout.succeeded_via.as_deref(), Some("button[data-test=\"checkout\"]"));
    assert_eq!(checkout.attempts.len(), 1);
}

#[tokio::test]
async fn checkpoints_are_not_counted_as_diagnostics() {
    let harness = Harness::new(SimConfig::default());
    let report = harness.run("purchase", &persona("standard")).await;

    assert!(report.success);
    assert_eq!(harness.diagnostics.captures(), 0);
    assert_eq!(
        harness.sink.names(),
        vec![
            "standard-checkout-overview.png".to_string(),
            "standard-checkout-complete.png".to_string()
        ]
    );
    assert!(report.step("overview-checkpoint").unwrap().checkpoint.is_some());
}

#[tokio::test]
async fn failed_checkpoint_is_a_warning() {
    let harness = Harness::new(SimConfig::default().with_failing_screenshots());
    let report = harness.run("purchase", &persona("standard")).await;

    assert!(report.success, "{:?}", report.error);
    let checkpoint = report.step("complete-checkpoint").unwrap();
    assert!(checkpoint.checkpoint.is_none());
    assert_eq!(checkpoint.warnings.len(), 1);
}

#[tokio::test]
async fn locked_out_purchase_ends_after_login() {
    let harness = Harness::new(SimConfig::default());
    let report = harness.run("purchase", &persona("locked_out")).await;

    assert!(report.success, "{:?}", report.error);
    assert!(report.ended_early);
    assert!(report.observed(Deviation::LoginRejected));
    assert!(report.failed_step().is_none());

    let submit = report.step("submit-login").unwrap();
    assert_eq!(submit.status, StepStatus::ExpectedDeviation);
    assert_eq!(report.step("sort-by-price").unwrap().status, StepStatus::Skipped);
    assert_eq!(report.step("complete-checkpoint").unwrap().status, StepStatus::Skipped);
}

#[tokio::test]
async fn problem_persona_records_sorting_deviation() {
    let harness = Harness::new(SimConfig::default());
    let report = harness.run("purchase", &persona("problem")).await;

    assert!(report.success, "{:?}", report.error);
    assert!(report.observed(Deviation::UnreliableSorting));
    assert!(report.observed(Deviation::UnreliableFormInput));
    assert_eq!(
        report.step("sort-by-price").unwrap().status,
        StepStatus::ExpectedDeviation
    );
    assert_eq!(
        report.step("fill-last-name").unwrap().status,
        StepStatus::ExpectedDeviation
    );
    assert_eq!(report.step("fill-postal-code").unwrap().status, StepStatus::Skipped);
}

#[tokio::test]
async fn exhausted_step_aborts_and_skips_the_rest() {
    let config = SimConfig::default()
        .with_broken_selector("text=Checkout")
        .with_broken_selector("a:has-text(\"Checkout\")");
    let harness = Harness::new(config);
    let report = harness.run("purchase", &persona("standard")).await;

    assert!(!report.success);
    let failed = report.failed_step().unwrap();
    assert_eq!(failed.step_id, "checkout");
    assert_eq!(failed.attempts.len(), 6);
    assert_eq!(failed.error.as_ref().unwrap().kind, "strategy_exhausted");
    let bundle = failed.diagnostics.as_ref().unwrap();
    assert!(bundle.label.contains("activate checkout"));
    assert_eq!(harness.diagnostics.captures(), 1);

    for id in ["fill-first-name", "continue", "finish", "complete-checkpoint"] {
        assert_eq!(report.step(id).unwrap().status, StepStatus::Skipped, "{id}");
    }
}

#[tokio::test]
async fn popup_replaces_the_page_for_later_checks() {
    let harness = Harness::new(SimConfig::default().with_about_link(AboutLinkMode::Popup));
    let report = harness.run("about", &persona("standard")).await;

    assert!(report.success, "{:?}", report.error);
    let about = report.step("open-about").unwrap();
    assert_eq!(about.transition, Some(NavigationRaceKind::NewContextOpened));
    assert_ne!(about.page_id, report.step("open-menu").unwrap().page_id);
}

#[tokio::test]
async fn same_page_about_keeps_the_page() {
    let harness = Harness::new(SimConfig::default());
    let report = harness.run("about", &persona("standard")).await;

    assert!(report.success, "{:?}", report.error);
    let about = report.step("open-about").unwrap();
    assert_eq!(about.transition, Some(NavigationRaceKind::SamePageNavigation));
    assert_eq!(about.page_id, report.step("open-menu").unwrap().page_id);
}

#[tokio::test]
async fn inert_about_link_fails_with_navigation_timeout() {
    let harness = Harness::new(SimConfig::default().with_about_link(AboutLinkMode::Inert));
    let report = harness.run("about", &persona("standard")).await;

    assert!(!report.success);
    let about = report.failed_step().unwrap();
    assert_eq!(about.step_id, "open-about");
    assert_eq!(about.succeeded_via.as_deref(), Some("#about_sidebar_link"));
    assert_eq!(about.error.as_ref().unwrap().kind, "navigation_timed_out");
    assert_eq!(harness.diagnostics.captures(), 0);
}

#[tokio::test]
async fn logout_returns_to_login_page() {
    let harness = Harness::new(SimConfig::default());
    let report = harness.run("logout", &persona("standard")).await;

    assert!(report.success, "{:?}", report.error);
    assert_eq!(report.steps.last().unwrap().step_id, "logout");
}

#[tokio::test]
async fn glitch_login_is_slower_than_standard() {
    let harness = Harness::new(fast_glitch());
    let baseline = harness.run("login", &persona("standard")).await;
    let glitch_persona = persona("performance_glitch");
    let candidate = harness.run("login", &glitch_persona).await;

    assert!(baseline.success && candidate.success);
    let cmp = LatencyComparison::between("submit-login", &baseline, &candidate, &glitch_persona)
        .unwrap();
    assert!(cmp.candidate_slower);
    assert!(cmp.delta_ms >= 300, "delta {}", cmp.delta_ms);
    // The simulated delay is far below the persona's 3000ms expectation.
    assert_eq!(cmp.meets_expected_added_latency, Some(false));
    // The click returns at once; the delayed landing is inside the measured span.
    let step = candidate.step("submit-login").unwrap();
    assert!(step.action_elapsed_ms < 300);
    assert!(step.elapsed_ms >= 400, "elapsed {}", step.elapsed_ms);
    assert_eq!(cmp.candidate_ms, step.elapsed_ms);
}

#[tokio::test]
async fn journey_budget_bounds_a_slow_step() {
    let harness = Harness::with_budget(
        SimConfig::default().with_glitch_delay(Duration::from_secs(5)),
        Duration::from_millis(300),
    );
    let report = harness.run("login", &persona("performance_glitch")).await;

    assert!(!report.success);
    let failed = report.failed_step().unwrap();
    assert_eq!(failed.step_id, "submit-login");
    assert_eq!(failed.error.as_ref().unwrap().kind, "timeout");
}
