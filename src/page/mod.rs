//! Page capability module.
//!
//! The resolver and the submission protocol never touch an ambient document.
//! Every operation receives an explicit page handle:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Page`] | Live document: element queries and current location |
//! | [`PageElement`] | Element handle: value, synthetic key events, click |
//! | [`By`] | Locator strategy passed to [`Page::query`] |
//! | [`MemoryPage`] | In-memory page for tests, demos and benchmarks |
//!
//! # Example
//!
//! ```ignore
//! use form_pilot::{By, MemoryPage, Page};
//!
//! let page = MemoryPage::new("https://mail.example.com/login");
//! page.insert(By::name("totp"));
//!
//! let input = page.query(&By::css("[name='totp']")).await?;
//! assert!(input.is_some());
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Keyboard keys and synthetic typing sequences.
pub mod keyboard;

/// In-memory page implementation.
pub mod memory;

/// Element locator strategies.
pub mod selector;

// ============================================================================
// Re-exports
// ============================================================================

pub use keyboard::{Key, KeyEvent, KeyEventKind, KeyStroke};
pub use memory::{ClickHandler, MemoryElement, MemoryPage};
pub use selector::By;

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;

use crate::error::Result;

// ============================================================================
// Traits
// ============================================================================

/// A live document the core can read from.
///
/// Implementations wrap whatever drives the real page (a webview preload
/// bridge, a WebDriver tab, ...). Queries must not mutate the page.
#[async_trait]
pub trait Page: Send + Sync {
    /// Element handle type produced by [`query`](Self::query).
    type Element: PageElement + Clone + Send + Sync + 'static;

    /// Finds one element, returning `None` when nothing matches yet.
    async fn query(&self, by: &By) -> Result<Option<Self::Element>>;

    /// Returns the current location (`window.location.href`).
    async fn current_location(&self) -> Result<String>;
}

/// A handle to one element of a [`Page`].
#[async_trait]
pub trait PageElement: Send + Sync {
    /// Returns the element's current `value`.
    async fn value(&self) -> Result<String>;

    /// Assigns the element's `value` without dispatching any event.
    async fn set_value(&self, value: &str) -> Result<()>;

    /// Dispatches one synthetic keyboard/input event on the element.
    async fn dispatch_key_event(&self, event: &KeyEvent) -> Result<()>;

    /// Clicks the element.
    async fn click(&self) -> Result<()>;
}
