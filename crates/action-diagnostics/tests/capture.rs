use action_diagnostics::{
    capture_checkpoint, DiagnosticsCapture, DiagnosticsError, FailureDiagnostics,
    MemoryArtifactSink, PNG_MIME,
};
use page_adapter::{PageDriver, PageHandle};
use std::sync::Arc;
use storefront_core_types::ScenarioId;
use storefront_sim::{SimBrowser, SimConfig, DEFAULT_BASE_URL};

async fn login_page(config: SimConfig) -> Arc<storefront_sim::SimPage> {
    let page = SimBrowser::launch(config).new_context();
    page.navigate(DEFAULT_BASE_URL).await.unwrap();
    page
}

#[tokio::test]
async fn bundle_label_names_scenario_and_action() {
    let sim = login_page(SimConfig::default()).await;
    let page: PageHandle = sim;
    let sink = Arc::new(MemoryArtifactSink::new());
    let capture = DiagnosticsCapture::new(sink.clone(), ScenarioId::parse("standard purchase").unwrap());

    let bundle = capture
        .capture_on_failure(&page, "activate checkout control")
        .await
        .unwrap();

    assert_eq!(bundle.label, "standard purchase: activate checkout control");
    assert_eq!(bundle.associated_action_description, "activate checkout control");
    assert_eq!(
        bundle.artifact_name,
        "failure-standard-purchase-activate-checkout-control.png"
    );
    assert_eq!(sink.len(), 1);
    let stored = &sink.artifacts()[0];
    assert_eq!(stored.mime_type, PNG_MIME);
    assert_eq!(bundle.screenshot.size_bytes, stored.bytes.len());
    assert_eq!(capture.captures(), 1);
}

#[tokio::test]
async fn torn_down_page_reports_screenshot_error() {
    let sim = login_page(SimConfig::default()).await;
    sim.close();
    let page: PageHandle = sim;
    let sink = Arc::new(MemoryArtifactSink::new());
    let capture = DiagnosticsCapture::new(sink.clone(), ScenarioId::parse("locked_out").unwrap());

    let err = capture
        .capture_on_failure(&page, "submit login")
        .await
        .unwrap_err();

    assert!(matches!(err, DiagnosticsError::Screenshot(_)));
    assert!(sink.is_empty());
    assert_eq!(capture.captures(), 1);
}

#[tokio::test]
async fn store_rejection_is_reported() {
    let page: PageHandle = login_page(SimConfig::default()).await;
    let capture = DiagnosticsCapture::new(
        Arc::new(MemoryArtifactSink::rejecting()),
        ScenarioId::parse("problem").unwrap(),
    );

    let err = capture
        .capture_on_failure(&page, "finish order")
        .await
        .unwrap_err();
    assert!(matches!(err, DiagnosticsError::Store { .. }));
}

#[tokio::test]
async fn checkpoint_uses_scope_prefixed_name() {
    let page: PageHandle = login_page(SimConfig::default()).await;
    let sink = MemoryArtifactSink::new();

    let artifact = capture_checkpoint(&page, &sink, "performance_glitch", "checkout-complete")
        .await
        .unwrap();

    assert_eq!(artifact.name, "performance-glitch-checkout-complete.png");
    assert_eq!(sink.names(), vec!["performance-glitch-checkout-complete.png"]);
}
