use crate::catalog::{Account, SortKey, Store};
use crate::dom::{render, Behavior, Element, Route, ABOUT_URL};
use crate::{AboutLinkMode, SimConfig};
use async_trait::async_trait;
use page_adapter::{AdapterError, AdapterErrorKind, NewContextListener, PageDriver, PageHandle};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storefront_core_types::PageId;
use tokio::sync::broadcast;
use tracing::debug;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// State shared by every page opened inside one browsing session.
pub(crate) struct Session {
    pub(crate) config: Arc<SimConfig>,
    pub(crate) root: String,
    pub(crate) store: Mutex<Store>,
    pub(crate) opened: broadcast::Sender<PageHandle>,
}

impl Session {
    pub(crate) fn new(config: Arc<SimConfig>) -> Arc<Self> {
        let root = site_root(&config.base_url);
        let (opened, _) = broadcast::channel(8);
        Arc::new(Self {
            config,
            root,
            store: Mutex::new(Store::default()),
            opened,
        })
    }
}

fn site_root(base_url: &str) -> String {
    if let Some(root) = base_url.strip_suffix("index.html") {
        root.to_string()
    } else if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    }
}

struct PageInner {
    id: PageId,
    session: Arc<Session>,
    url: Mutex<String>,
    closed: AtomicBool,
    url_reads: AtomicUsize,
}

/// One simulated tab.
#[derive(Clone)]
pub struct SimPage {
    inner: Arc<PageInner>,
}

impl SimPage {
    pub(crate) fn open(session: Arc<Session>, url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(PageInner {
                id: PageId::new(),
                session,
                url: Mutex::new(url.into()),
                closed: AtomicBool::new(false),
                url_reads: AtomicUsize::new(0),
            }),
        }
    }

    /// Tear the page down. Every later call fails with `ContextClosed`.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// How many times the current URL has been read.
    pub fn url_reads(&self) -> usize {
        self.inner.url_reads.load(Ordering::SeqCst)
    }

    /// Number of items currently in the session's cart.
    pub fn cart_len(&self) -> usize {
        self.inner.session.store.lock().cart.len()
    }

    pub fn signed_in_account(&self) -> Option<Account> {
        self.inner.session.store.lock().account
    }

    fn ensure_open(&self) -> Result<(), AdapterError> {
        if self.is_closed() {
            Err(AdapterError::context_closed())
        } else {
            Ok(())
        }
    }

    fn route(&self) -> Route {
        Route::parse(&self.inner.url.lock(), &self.inner.session.root)
    }

    fn set_route(&self, route: &Route) {
        *self.inner.url.lock() = route.url(&self.inner.session.root);
    }

    fn elements(&self) -> Vec<Element> {
        let store = self.inner.session.store.lock();
        render(&self.route(), &store, self.inner.session.config.markup)
    }

    fn visible_matches(&self, selector: &str) -> Vec<Element> {
        self.elements()
            .into_iter()
            .filter(|e| e.visible && e.matches(selector))
            .collect()
    }

    fn first_visible(&self, selector: &str) -> Result<Element, AdapterError> {
        self.visible_matches(selector)
            .into_iter()
            .next()
            .ok_or_else(|| AdapterError::target_not_found(selector))
    }

    fn activate(&self, behavior: Behavior) {
        let session = &self.inner.session;
        let next = {
            let mut store = session.store.lock();
            match behavior {
                Behavior::Static | Behavior::Input(_) | Behavior::SortSelect => None,
                Behavior::Login => match store.attempt_login(&session.config.password) {
                    Ok(Account::PerformanceGlitch) => {
                        drop(store);
                        self.navigate_later(Route::Inventory, session.config.glitch_delay);
                        None
                    }
                    Ok(_) => Some(Route::Inventory),
                    Err(message) => {
                        debug!(%message, "simulated login rejected");
                        None
                    }
                },
                Behavior::DismissError => {
                    store.login_error = None;
                    store.checkout_error = None;
                    None
                }
                Behavior::AddToCart(id) => {
                    if !store.in_cart(id) {
                        store.cart.push(id);
                    }
                    None
                }
                Behavior::RemoveFromCart(id) => {
                    store.cart.retain(|item| *item != id);
                    None
                }
                Behavior::OpenItem(id) => Some(Route::Item(id)),
                Behavior::BackToProducts | Behavior::ContinueShopping | Behavior::AllItems => {
                    store.menu_open = false;
                    Some(Route::Inventory)
                }
                Behavior::OpenCart => Some(Route::Cart),
                Behavior::Checkout => Some(Route::CheckoutInfo),
                Behavior::ContinueCheckout => {
                    if store.validate_checkout_info() {
                        Some(Route::CheckoutOverview)
                    } else {
                        None
                    }
                }
                Behavior::CancelCheckout => Some(Route::Cart),
                Behavior::Finish => {
                    store.cart.clear();
                    Some(Route::CheckoutComplete)
                }
                Behavior::OpenMenu => {
                    store.menu_open = true;
                    None
                }
                Behavior::CloseMenu => {
                    store.menu_open = false;
                    None
                }
                Behavior::About => {
                    store.menu_open = false;
                    drop(store);
                    self.follow_about_link();
                    None
                }
                Behavior::Logout => {
                    store.sign_out();
                    Some(Route::Login)
                }
                Behavior::ResetApp => {
                    store.cart.clear();
                    store.sort = SortKey::default();
                    None
                }
            }
        };
        if let Some(route) = next {
            self.set_route(&route);
        }
    }

    fn navigate_later(&self, route: Route, delay: Duration) {
        let page = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !page.is_closed() {
                page.set_route(&route);
            }
        });
    }

    fn follow_about_link(&self) {
        let session = &self.inner.session;
        match session.config.about_link {
            AboutLinkMode::SamePage => {
                *self.inner.url.lock() = ABOUT_URL.to_string();
            }
            AboutLinkMode::Popup => {
                let popup = SimPage::open(session.clone(), ABOUT_URL);
                debug!(popup = %popup.inner.id, "simulated popup opened");
                let handle: PageHandle = Arc::new(popup);
                if session.opened.send(handle).is_err() {
                    debug!("popup opened with no listener attached");
                }
            }
            AboutLinkMode::Inert => {}
        }
    }
}

#[async_trait]
impl PageDriver for SimPage {
    fn page_id(&self) -> PageId {
        self.inner.id.clone()
    }

    async fn navigate(&self, url: &str) -> Result<(), AdapterError> {
        self.ensure_open()?;
        let route = Route::parse(url, &self.inner.session.root);
        let signed_in = self.inner.session.store.lock().account.is_some();
        if route.requires_login() && !signed_in {
            let path = url.rsplit('/').next().unwrap_or(url);
            self.inner.session.store.lock().login_error = Some(format!(
                "Epic sadface: You can only access '/{}' when you are logged in.",
                path
            ));
            self.set_route(&Route::Login);
        } else {
            *self.inner.url.lock() = route.url(&self.inner.session.root);
        }
        debug!(page = %self.inner.id, url, "simulated navigation");
        Ok(())
    }

    async fn current_url(&self) -> Result<String, AdapterError> {
        self.ensure_open()?;
        self.inner.url_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.inner.url.lock().clone())
    }

    async fn find_all(&self, selector: &str) -> Result<usize, AdapterError> {
        self.ensure_open()?;
        Ok(self.visible_matches(selector).len())
    }

    async fn click(&self, selector: &str, timeout: Duration) -> Result<(), AdapterError> {
        self.ensure_open()?;
        if let Some(delay) = self.inner.session.config.click_delays.get(selector).copied() {
            if delay > timeout {
                tokio::time::sleep(timeout).await;
                return Err(AdapterError::timeout("click", timeout));
            }
            tokio::time::sleep(delay).await;
            self.ensure_open()?;
        }

        let element = self
            .elements()
            .into_iter()
            .find(|e| e.matches(selector))
            .ok_or_else(|| AdapterError::target_not_found(selector))?;
        if !element.visible {
            return Err(AdapterError::new(AdapterErrorKind::NotInteractable)
                .with_hint(format!("'{}' is not visible", selector)));
        }
        if self
            .inner
            .session
            .config
            .broken_selectors
            .iter()
            .any(|broken| broken == selector)
        {
            return Err(AdapterError::new(AdapterErrorKind::NotInteractable)
                .with_hint(format!("'{}' is covered by another element", selector)));
        }

        debug!(page = %self.inner.id, selector, "simulated click");
        self.activate(element.behavior);
        Ok(())
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<(), AdapterError> {
        self.ensure_open()?;
        let element = self.first_visible(selector)?;
        match element.behavior {
            Behavior::Input(field) => {
                self.inner.session.store.lock().set_field(field, text);
                Ok(())
            }
            _ => Err(AdapterError::new(AdapterErrorKind::NotInteractable)
                .with_hint(format!("'{}' is not an input", selector))),
        }
    }

    async fn read_text(&self, selector: &str) -> Result<String, AdapterError> {
        self.ensure_open()?;
        Ok(self.first_visible(selector)?.text)
    }

    async fn read_all_text(&self, selector: &str) -> Result<Vec<String>, AdapterError> {
        self.ensure_open()?;
        Ok(self
            .visible_matches(selector)
            .into_iter()
            .map(|e| e.text)
            .collect())
    }

    async fn input_value(&self, selector: &str) -> Result<String, AdapterError> {
        self.ensure_open()?;
        let element = self.first_visible(selector)?;
        match element.behavior {
            Behavior::Input(_) => Ok(element.text),
            _ => Err(AdapterError::new(AdapterErrorKind::NotInteractable)
                .with_hint(format!("'{}' is not an input", selector))),
        }
    }

    async fn select_option(&self, selector: &str, value: &str) -> Result<(), AdapterError> {
        self.ensure_open()?;
        let element = self.first_visible(selector)?;
        if element.behavior != Behavior::SortSelect {
            return Err(AdapterError::new(AdapterErrorKind::NotInteractable)
                .with_hint(format!("'{}' is not a select", selector)));
        }
        let key = SortKey::from_option(value).ok_or_else(|| {
            AdapterError::new(AdapterErrorKind::OptionNotFound)
                .with_hint(format!("no option '{}' in '{}'", value, selector))
        })?;
        self.inner.session.store.lock().sort = key;
        Ok(())
    }

    fn new_context_listener(&self) -> NewContextListener {
        NewContextListener::new(self.inner.session.opened.subscribe())
    }

    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>, AdapterError> {
        self.ensure_open()?;
        if self.inner.session.config.fail_screenshots {
            return Err(AdapterError::new(AdapterErrorKind::Io).with_hint("capture backend unavailable"));
        }
        let url = self.inner.url.lock().clone();
        let texts: Vec<String> = self
            .elements()
            .into_iter()
            .filter(|e| e.visible && !e.text.is_empty())
            .map(|e| e.text)
            .collect();
        let body = json!({
            "page": self.inner.id.to_string(),
            "url": url,
            "full_page": full_page,
            "text": texts,
        });
        let mut bytes = PNG_SIGNATURE.to_vec();
        let encoded = serde_json::to_vec(&body).map_err(|err| {
            AdapterError::new(AdapterErrorKind::Internal).with_hint(err.to_string())
        })?;
        bytes.extend(encoded);
        Ok(bytes)
    }
}
