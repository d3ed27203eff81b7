//! One-shot subscription to "new browsing context opened" events.

use crate::{AdapterError, PageHandle};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};

/// Listener handed out by [`crate::PageDriver::new_context_listener`].
///
/// The subscription exists from the moment the listener is created, so any
/// context opened after that point is observed even if [`wait`](Self::wait)
/// is polled later.
pub struct NewContextListener {
    rx: Option<broadcast::Receiver<PageHandle>>,
}

impl NewContextListener {
    pub fn new(rx: broadcast::Receiver<PageHandle>) -> Self {
        Self { rx: Some(rx) }
    }

    /// Listener for a driver that never opens additional contexts.
    pub fn detached() -> Self {
        Self { rx: None }
    }

    /// Wait up to `timeout` for a new context. `Ok(None)` means none opened.
    pub async fn wait(mut self, timeout: Duration) -> Result<Option<PageHandle>, AdapterError> {
        let Some(mut rx) = self.rx.take() else {
            tokio::time::sleep(timeout).await;
            return Ok(None);
        };

        let received = tokio::time::timeout(timeout, async move {
            loop {
                match rx.recv().await {
                    Ok(page) => return Some(page),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => return None,
                }
            }
        })
        .await;

        Ok(received.unwrap_or(None))
    }
}
