//! In-memory page implementation.
//!
//! [`MemoryPage`] behaves like a tiny live document: elements can be attached
//! and detached at any time, clicks run scripted handlers (typically a
//! navigation), and every value write and key event is recorded so tests can
//! assert on what the core did to the page.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use form_pilot::{By, MemoryPage};
//!
//! let page = MemoryPage::new("https://mail.example.com/login");
//! let input = page.insert(By::name("totp"));
//! let button = page.insert(By::css("button[type='submit']"));
//!
//! // Navigate on the second click only.
//! button.on_click(Arc::new(|page: &MemoryPage, clicks: u32| {
//!     if clicks == 2 {
//!         page.set_location("https://mail.example.com/inbox");
//!     }
//! }))?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::identifiers::ElementId;

use super::keyboard::{KeyEvent, KeyEventKind};
use super::selector::By;
use super::{Page, PageElement};

// ============================================================================
// Types
// ============================================================================

/// Callback run after an element is clicked.
///
/// Receives the page and the element's total click count (1-based).
pub type ClickHandler = Arc<dyn Fn(&MemoryPage, u32) + Send + Sync>;

/// Mutable state of one element.
#[derive(Default)]
struct NodeState {
    value: String,
    events: Vec<KeyEvent>,
    clicks: u32,
    on_click: Option<ClickHandler>,
    input_error: Option<String>,
}

/// Shared document state.
#[derive(Default)]
struct PageState {
    location: String,
    locators: FxHashMap<By, ElementId>,
    nodes: FxHashMap<ElementId, NodeState>,
    queries: FxHashMap<By, u32>,
}

// ============================================================================
// MemoryPage
// ============================================================================

/// A cheaply cloneable in-memory document.
#[derive(Clone, Default)]
pub struct MemoryPage {
    inner: Arc<Mutex<PageState>>,
}

impl fmt::Debug for MemoryPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("MemoryPage")
            .field("location", &state.location)
            .field("elements", &state.nodes.len())
            .finish_non_exhaustive()
    }
}

impl MemoryPage {
    /// Creates an empty page at `location`.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PageState {
                location: location.into(),
                ..PageState::default()
            })),
        }
    }

    /// Attaches a new empty element reachable through `by`.
    ///
    /// Equivalent locators (`By::id("x")` and `By::css("#x")`) address the
    /// same element. A previous element under the same locator is detached.
    pub fn insert(&self, by: impl Into<By>) -> MemoryElement {
        let by = by.into().canonical();
        let id = ElementId::generate();

        let mut state = self.inner.lock();
        if let Some(previous) = state.locators.insert(by.clone(), id.clone()) {
            state.nodes.remove(&previous);
        }
        state.nodes.insert(id.clone(), NodeState::default());
        drop(state);

        debug!(element_id = %id, locator = %by, "Element attached");
        MemoryElement {
            id,
            page: self.clone(),
        }
    }

    /// Detaches the element reachable through `by`.
    ///
    /// Returns `false` if nothing was attached. Existing handles become stale.
    pub fn remove(&self, by: impl Into<By>) -> bool {
        let by = by.into().canonical();
        let mut state = self.inner.lock();
        match state.locators.remove(&by) {
            Some(id) => {
                state.nodes.remove(&id);
                true
            }
            None => false,
        }
    }

    /// Returns the current location.
    #[must_use]
    pub fn location(&self) -> String {
        self.inner.lock().location.clone()
    }

    /// Replaces the current location, simulating a navigation.
    pub fn set_location(&self, location: impl Into<String>) {
        let location = location.into();
        debug!(%location, "Location changed");
        self.inner.lock().location = location;
    }

    /// Returns how many times `by` has been queried.
    #[must_use]
    pub fn query_count(&self, by: impl Into<By>) -> u32 {
        let by = by.into().canonical();
        self.inner.lock().queries.get(&by).copied().unwrap_or(0)
    }

    fn with_node<T>(&self, id: &ElementId, f: impl FnOnce(&mut NodeState) -> T) -> Result<T> {
        let mut state = self.inner.lock();
        state
            .nodes
            .get_mut(id)
            .map(f)
            .ok_or_else(|| Error::stale_element(id.clone()))
    }
}

#[async_trait]
impl Page for MemoryPage {
    type Element = MemoryElement;

    async fn query(&self, by: &By) -> Result<Option<MemoryElement>> {
        let by = by.canonical();
        let mut state = self.inner.lock();
        *state.queries.entry(by.clone()).or_insert(0) += 1;

        Ok(state.locators.get(&by).map(|id| MemoryElement {
            id: id.clone(),
            page: self.clone(),
        }))
    }

    async fn current_location(&self) -> Result<String> {
        Ok(self.location())
    }
}

// ============================================================================
// MemoryElement
// ============================================================================

/// Handle to an element of a [`MemoryPage`].
///
/// Handles compare equal when they refer to the same element.
#[derive(Clone)]
pub struct MemoryElement {
    id: ElementId,
    page: MemoryPage,
}

impl fmt::Debug for MemoryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryElement")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl PartialEq for MemoryElement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.page.inner, &other.page.inner)
    }
}

impl Eq for MemoryElement {}

impl MemoryElement {
    /// Returns this element's ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    /// Installs the handler run after each click.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleElement`] if the element was detached.
    pub fn on_click(&self, handler: ClickHandler) -> Result<()> {
        self.page
            .with_node(&self.id, |node| node.on_click = Some(handler))
    }

    /// Makes every subsequent value write and key event fail with `message`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleElement`] if the element was detached.
    pub fn fail_input(&self, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        self.page
            .with_node(&self.id, |node| node.input_error = Some(message))
    }

    /// Pre-fills the value, as a page restoring form state would.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleElement`] if the element was detached.
    pub fn prefill(&self, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        self.page.with_node(&self.id, |node| node.value = value)
    }

    /// Returns the number of clicks received.
    #[must_use]
    pub fn clicks(&self) -> u32 {
        self.page.with_node(&self.id, |node| node.clicks).unwrap_or(0)
    }

    /// Returns every key event dispatched so far.
    #[must_use]
    pub fn events(&self) -> Vec<KeyEvent> {
        self.page
            .with_node(&self.id, |node| node.events.clone())
            .unwrap_or_default()
    }

    /// Returns the text reconstructed from dispatched `input` events.
    #[must_use]
    pub fn typed_text(&self) -> String {
        self.events()
            .iter()
            .filter(|e| e.kind == KeyEventKind::Input)
            .map(|e| e.stroke.key.as_str())
            .collect()
    }
}

#[async_trait]
impl PageElement for MemoryElement {
    async fn value(&self) -> Result<String> {
        self.page.with_node(&self.id, |node| node.value.clone())
    }

    async fn set_value(&self, value: &str) -> Result<()> {
        self.page.with_node(&self.id, |node| match &node.input_error {
            Some(message) => Err(Error::page(message.clone())),
            None => {
                node.value = value.to_string();
                Ok(())
            }
        })?
    }

    async fn dispatch_key_event(&self, event: &KeyEvent) -> Result<()> {
        self.page.with_node(&self.id, |node| match &node.input_error {
            Some(message) => Err(Error::page(message.clone())),
            None => {
                node.events.push(event.clone());
                Ok(())
            }
        })?
    }

    async fn click(&self) -> Result<()> {
        debug!(element_id = %self.id, "Clicking element");

        let (clicks, handler) = self.page.with_node(&self.id, |node| {
            node.clicks += 1;
            (node.clicks, node.on_click.clone())
        })?;

        // Run outside the lock: handlers usually mutate the page.
        if let Some(handler) = handler {
            handler(&self.page, clicks);
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::page::keyboard::input_events;

    #[test]
    fn test_memory_element_is_clone_and_debug() {
        fn assert_traits<T: Clone + fmt::Debug + Send + Sync>() {}
        assert_traits::<MemoryElement>();
        assert_traits::<MemoryPage>();
    }

    #[tokio::test]
    async fn test_query_matches_equivalent_locators() {
        let page = MemoryPage::new("about:blank");
        let inserted = page.insert(By::id("code"));

        let found = page.query(&By::css("#code")).await.unwrap();
        assert_eq!(found, Some(inserted));
        assert_eq!(page.query_count(By::id("code")), 1);
    }

    #[tokio::test]
    async fn test_query_missing_returns_none() {
        let page = MemoryPage::new("about:blank");
        assert!(page.query(&By::name("totp")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_removed_element_is_stale() {
        let page = MemoryPage::new("about:blank");
        let input = page.insert(By::name("totp"));
        assert!(page.remove(By::name("totp")));

        let err = input.value().await.unwrap_err();
        assert!(matches!(err, Error::StaleElement { .. }));
    }

    #[tokio::test]
    async fn test_click_runs_handler() {
        let page = MemoryPage::new("https://a.test/login");
        let button = page.insert(By::tag("button"));
        button.on_click(Arc::new(|page: &MemoryPage, clicks: u32| {
            page.set_location(format!("https://a.test/step{clicks}"));
        }))
        .unwrap();

        button.click().await.unwrap();
        button.click().await.unwrap();

        assert_eq!(button.clicks(), 2);
        assert_eq!(page.current_location().await.unwrap(), "https://a.test/step2");
    }

    #[tokio::test]
    async fn test_records_typed_text() {
        let page = MemoryPage::new("about:blank");
        let input = page.insert(By::name("totp"));

        for event in input_events("12 Ab") {
            input.dispatch_key_event(&event).await.unwrap();
        }
        assert_eq!(input.typed_text(), "12 Ab");
    }

    #[test]
    fn test_setup_on_detached_element_fails() {
        let page = MemoryPage::new("about:blank");
        let input = page.insert(By::name("totp"));
        page.remove(By::name("totp"));

        assert!(matches!(input.prefill("1"), Err(Error::StaleElement { .. })));
        assert!(matches!(input.fail_input("x"), Err(Error::StaleElement { .. })));
        assert!(matches!(
            input.on_click(Arc::new(|_: &MemoryPage, _: u32| {})),
            Err(Error::StaleElement { .. })
        ));
    }

    #[tokio::test]
    async fn test_fail_input() {
        let page = MemoryPage::new("about:blank");
        let input = page.insert(By::name("totp"));
        input.fail_input("InvalidStateError").unwrap();

        let err = input.set_value("123456").await.unwrap_err();
        assert_eq!(err.to_string(), "Page error: InvalidStateError");
        assert_eq!(input.value().await.unwrap(), "");
    }
}
