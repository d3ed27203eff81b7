//! Page-control seam for the storefront verification layers.
//!
//! Rendering, DOM access and screenshots belong to whatever browser backend
//! implements [`PageDriver`]; reports and screenshots go to an
//! [`ArtifactSink`]. Selector descriptors and URLs are opaque strings here.

pub mod error;
mod listener;

pub use error::{AdapterError, AdapterErrorKind};
pub use listener::NewContextListener;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use storefront_core_types::PageId;

/// Shared handle to one page / browsing context.
pub type PageHandle = Arc<dyn PageDriver>;

/// Minimal page-control surface required by the upper layers.
#[async_trait]
pub trait PageDriver: Send + Sync {
    fn page_id(&self) -> PageId;

    async fn navigate(&self, url: &str) -> Result<(), AdapterError>;

    async fn current_url(&self) -> Result<String, AdapterError>;

    /// Number of elements currently matching `selector`.
    async fn find_all(&self, selector: &str) -> Result<usize, AdapterError>;

    async fn click(&self, selector: &str, timeout: Duration) -> Result<(), AdapterError>;

    async fn fill(&self, selector: &str, text: &str) -> Result<(), AdapterError>;

    /// Text of the first element matching `selector`.
    async fn read_text(&self, selector: &str) -> Result<String, AdapterError>;

    /// Text of every element matching `selector`, in document order.
    async fn read_all_text(&self, selector: &str) -> Result<Vec<String>, AdapterError>;

    async fn input_value(&self, selector: &str) -> Result<String, AdapterError>;

    async fn select_option(&self, selector: &str, value: &str) -> Result<(), AdapterError>;

    /// Subscribe to "new browsing context opened". Registration happens
    /// synchronously, before this call returns.
    fn new_context_listener(&self) -> NewContextListener;

    async fn on_new_context(&self, timeout: Duration) -> Result<Option<PageHandle>, AdapterError> {
        self.new_context_listener().wait(timeout).await
    }

    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>, AdapterError>;
}

/// Reference to an artifact accepted by an [`ArtifactSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: usize,
    pub location: Option<PathBuf>,
}

/// External report store.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn attach_artifact(
        &self,
        name: &str,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<ArtifactRef, AdapterError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast;

    struct BlankPage {
        id: PageId,
        opened: broadcast::Sender<PageHandle>,
    }

    #[async_trait]
    impl PageDriver for BlankPage {
        fn page_id(&self) -> PageId {
            self.id.clone()
        }
        async fn navigate(&self, _url: &str) -> Result<(), AdapterError> {
            Ok(())
        }
        async fn current_url(&self) -> Result<String, AdapterError> {
            Ok("about:blank".to_string())
        }
        async fn find_all(&self, _selector: &str) -> Result<usize, AdapterError> {
            Ok(0)
        }
        async fn click(&self, selector: &str, _timeout: Duration) -> Result<(), AdapterError> {
            Err(AdapterError::target_not_found(selector))
        }
        async fn fill(&self, selector: &str, _text: &str) -> Result<(), AdapterError> {
            Err(AdapterError::target_not_found(selector))
        }
        async fn read_text(&self, selector: &str) -> Result<String, AdapterError> {
            Err(AdapterError::target_not_found(selector))
        }
        async fn read_all_text(&self, _selector: &str) -> Result<Vec<String>, AdapterError> {
            Ok(Vec::new())
        }
        async fn input_value(&self, selector: &str) -> Result<String, AdapterError> {
            Err(AdapterError::target_not_found(selector))
        }
        async fn select_option(&self, selector: &str, _value: &str) -> Result<(), AdapterError> {
            Err(AdapterError::target_not_found(selector))
        }
        fn new_context_listener(&self) -> NewContextListener {
            NewContextListener::new(self.opened.subscribe())
        }
        async fn screenshot(&self, _full_page: bool) -> Result<Vec<u8>, AdapterError> {
            Ok(vec![0x89, b'P', b'N', b'G'])
        }
    }

    fn blank() -> Arc<BlankPage> {
        let (opened, _) = broadcast::channel(4);
        Arc::new(BlankPage {
            id: PageId::new(),
            opened,
        })
    }

    #[tokio::test]
    async fn listener_observes_context_opened_before_wait() {
        let page = blank();
        let listener = page.new_context_listener();
        let popup: PageHandle = blank();
        let popup_id = popup.page_id();
        page.opened.send(popup).ok();

        let received = listener
            .wait(Duration::from_millis(50))
            .await
            .unwrap()
            .expect("popup should be observed");
        assert_eq!(received.page_id(), popup_id);
    }

    #[tokio::test]
    async fn on_new_context_returns_none_after_timeout() {
        let page = blank();
        let result = page.on_new_context(Duration::from_millis(20)).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn detached_listener_never_yields() {
        let result = NewContextListener::detached()
            .wait(Duration::from_millis(10))
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
