//! Popup vs same-page navigation race

use crate::errors::ActionError;
use crate::pattern::UrlPattern;
use crate::types::{NavigationRaceKind, NavigationRaceOutcome, TransitionExpectation};
use page_adapter::PageHandle;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::{self, interval, sleep, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Races "a new browsing context opened" against "the current page's URL
/// matches the expected pattern" after a trigger fires.
#[derive(Debug, Clone)]
pub struct NavigationRaceCoordinator {
    poll_interval: Duration,
}

impl Default for NavigationRaceCoordinator {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl NavigationRaceCoordinator {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    pub async fn await_expectation<F>(
        &self,
        page: &PageHandle,
        trigger: F,
        expectation: &TransitionExpectation,
    ) -> Result<NavigationRaceOutcome, ActionError>
    where
        F: Future<Output = Result<(), ActionError>>,
    {
        self.await_transition(
            page,
            trigger,
            &expectation.url_pattern,
            expectation.popup_timeout_ms.map(Duration::from_millis),
            Duration::from_millis(expectation.navigation_timeout_ms),
        )
        .await
    }

    /// Run `trigger` and report which transition it caused.
    ///
    /// The new-context listener is registered before `trigger` is first
    /// polled. URL polling and the `navigation_timeout` deadline both start
    /// once the trigger has completed, so `trigger` must carry its own bound
    /// (see [`crate::perform`]). A trigger error is returned as-is; expiry of
    /// the deadline yields [`NavigationRaceKind::TimedOut`] with no page
    /// handle. The losing branch is dropped.
    pub async fn await_transition<F>(
        &self,
        page: &PageHandle,
        trigger: F,
        expected_url: &UrlPattern,
        popup_timeout: Option<Duration>,
        navigation_timeout: Duration,
    ) -> Result<NavigationRaceOutcome, ActionError>
    where
        F: Future<Output = Result<(), ActionError>>,
    {
        let start = Instant::now();
        let listener = popup_timeout.map(|bound| (page.new_context_listener(), bound));
        let mut popup_done = listener.is_none();
        let popup = async move {
            match listener {
                Some((listener, bound)) => listener.wait(bound).await,
                None => Ok(None),
            }
        };
        tokio::pin!(popup);
        tokio::pin!(trigger);
        let deadline = sleep(navigation_timeout);
        tokio::pin!(deadline);

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut trigger_done = false;

        loop {
            tokio::select! {
                biased;

                result = &mut trigger, if !trigger_done => {
                    result?;
                    trigger_done = true;
                    deadline.as_mut().reset(time::Instant::now() + navigation_timeout);
                    debug!(pattern = %expected_url, "transition trigger completed");
                }

                opened = &mut popup, if !popup_done => {
                    popup_done = true;
                    match opened {
                        Ok(Some(handle)) => {
                            let elapsed_ms = start.elapsed().as_millis() as u64;
                            info!(page = %handle.page_id(), elapsed_ms, "new browsing context won the race");
                            return Ok(NavigationRaceOutcome {
                                kind: NavigationRaceKind::NewContextOpened,
                                page: Some(handle),
                                matched_url_pattern: None,
                                elapsed_ms,
                            });
                        }
                        Ok(None) => debug!("no new browsing context within popup bound"),
                        Err(err) => warn!(error = %err, "new-context listener failed"),
                    }
                }

                _ = ticker.tick(), if trigger_done => {
                    match page.current_url().await {
                        Ok(url) if expected_url.is_match(&url) => {
                            let elapsed_ms = start.elapsed().as_millis() as u64;
                            info!(url = %url, elapsed_ms, "same-page navigation won the race");
                            return Ok(NavigationRaceOutcome {
                                kind: NavigationRaceKind::SamePageNavigation,
                                page: Some(page.clone()),
                                matched_url_pattern: Some(expected_url.as_str().to_string()),
                                elapsed_ms,
                            });
                        }
                        Ok(_) => {}
                        Err(err) => debug!(error = %err, "url poll failed"),
                    }
                }

                _ = &mut deadline, if trigger_done => {
                    let elapsed_ms = start.elapsed().as_millis() as u64;
                    warn!(
                        pattern = %expected_url,
                        timeout_ms = navigation_timeout.as_millis() as u64,
                        "navigation race timed out"
                    );
                    return Ok(NavigationRaceOutcome::timed_out(elapsed_ms));
                }
            }
        }
    }
}
