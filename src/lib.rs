//! Form Pilot - bounded DOM resolution and TOTP form submission.
//!
//! This library drives the login forms of a third-party web page from the
//! outside: it waits for the elements it needs and then submits a one-time
//! token through them, the way a user would.
//!
//! # Architecture
//!
//! Two components run against an explicit [`Page`] handle:
//!
//! - **Resolver**: polls a named set of lookups until every element is
//!   present, bounded by a wall-clock budget and an optional cycle budget
//! - **Submitter**: fills a token with synthetic key events, clicks the
//!   trigger, waits for navigation, and retries once with a fresh token
//!   on a submit timeout
//!
//! Key design principles:
//!
//! - No ambient document: every operation borrows its [`Page`]
//! - Lookups are queried until found, then never again
//! - Only the submitter's own timeout is retried
//! - Delays honour an optional [`CancellationToken`](tokio_util::sync::CancellationToken)
//!
//! # Quick Start
//!
//! ```no_run
//! use form_pilot::{By, LookupSet, MemoryPage, Resolver, Result, submit_totp_token};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let page = MemoryPage::new("https://mail.example.com/login");
//!     page.insert(By::name("totp"));
//!     page.insert(By::css("button[type='submit']"));
//!
//!     let mut lookups = LookupSet::new();
//!     lookups
//!         .query("input", &page, By::name("totp"))?
//!         .query("button", &page, By::css("button[type='submit']"))?;
//!
//!     let elements = Resolver::new().resolve(lookups).await?;
//!     let token = || -> Result<String> { Ok(String::from("123456")) };
//!
//!     submit_totp_token(&page, &elements["input"], &elements["button"], &token).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`page`] | [`Page`] capability traits, [`By`], [`MemoryPage`] |
//! | [`resolver`] | [`Resolver`], [`LookupSet`], [`ResolutionConfig`] |
//! | [`store`] | Persisted documents and their validators |
//! | [`submission`] | [`TotpSubmitter`], [`SubmissionTimings`] |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for sessions and elements.
pub mod identifiers;

/// Page capability traits and the in-memory page.
pub mod page;

/// Bounded polling resolution of named element lookups.
pub mod resolver;

/// Persisted store documents and validators.
pub mod store;

/// TOTP submission with a single retry.
pub mod submission;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ElementId, SessionId};

// Page types
pub use page::{By, Key, KeyEvent, KeyEventKind, MemoryElement, MemoryPage, Page, PageElement};

// Resolver types
pub use resolver::{
    LookupSet, ResolutionConfig, ResolutionState, ResolvedSet, Resolver, resolve,
};

// Store types
pub use store::{
    AccountLoginUniquenessValidator, AppConfig, ConfigEncryptionPresetValidator, Settings,
    StoreValidator,
};

// Submission types
pub use submission::{
    SubmissionContext, SubmissionTimings, TokenSource, TotpSubmitter, fill_input_value,
    submit_totp_token,
};
