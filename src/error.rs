//! Error types for form-pilot.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use form_pilot::{Error, Result};
//!
//! async fn example(resolver: &Resolver, lookups: LookupSet<'_, MemoryElement>) -> Result<()> {
//!     match resolver.resolve(lookups).await {
//!         Ok(resolved) => println!("{} elements", resolved.len()),
//!         Err(e) if e.is_resolution_error() => println!("page not ready: {e}"),
//!         Err(e) => return Err(e),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidArgument`] |
//! | Resolution | [`Error::ResolutionTimeout`], [`Error::IterationLimitExceeded`] |
//! | Submission | [`Error::PrefilledInput`], [`Error::SubmitTimeout`] |
//! | Control | [`Error::Cancelled`] |
//! | Page | [`Error::Page`], [`Error::StaleElement`] |
//! | External | [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::ElementId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when resolver/submission configuration or a persisted store
    /// document is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid argument.
    ///
    /// Returned when a caller-supplied value is unusable, e.g. a duplicate
    /// lookup key.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // Resolution Errors
    // ========================================================================
    /// Wall-clock budget exhausted with unresolved keys.
    #[error(
        "Failed to resolve DOM elements [{}] within {timeout_ms}ms",
        .unresolved.join(", ")
    )]
    ResolutionTimeout {
        /// Keys whose lookups never returned an element.
        unresolved: Vec<String>,
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
    },

    /// Poll count budget exhausted with unresolved keys.
    #[error(
        "Failed to resolve DOM elements [{}] having {iterations} iterations performed",
        .unresolved.join(", ")
    )]
    IterationLimitExceeded {
        /// Keys whose lookups never returned an element.
        unresolved: Vec<String>,
        /// Number of poll cycles performed.
        iterations: u32,
    },

    // ========================================================================
    // Submission Errors
    // ========================================================================
    /// Target input already holds a value.
    ///
    /// Indicates a caller-side sequencing bug, never retried.
    #[error("2FA TOTP token is not supposed to be pre-filled on this stage")]
    PrefilledInput,

    /// No navigation observed after the settle delay.
    ///
    /// The only error the submission protocol retries, and only once.
    #[error("Failed to submit two factor token within {delay_ms}ms")]
    SubmitTimeout {
        /// Settle delay waited before verifying, in milliseconds.
        delay_ms: u64,
    },

    // ========================================================================
    // Control Errors
    // ========================================================================
    /// Operation aborted through its cancellation token.
    #[error("Cancelled: {operation}")]
    Cancelled {
        /// Description of the cancelled operation.
        operation: String,
    },

    // ========================================================================
    // Page Errors
    // ========================================================================
    /// Failure raised by a page handle (query, input, click).
    #[error("Page error: {message}")]
    Page {
        /// Error message reported by the page.
        message: String,
    },

    /// Element is stale (no longer attached to the page).
    #[error("Stale element: {element_id}")]
    StaleElement {
        /// The stale element's ID.
        element_id: ElementId,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a resolution timeout error.
    #[inline]
    pub fn resolution_timeout(unresolved: Vec<String>, timeout_ms: u64) -> Self {
        Self::ResolutionTimeout {
            unresolved,
            timeout_ms,
        }
    }

    /// Creates an iteration limit error.
    #[inline]
    pub fn iteration_limit_exceeded(unresolved: Vec<String>, iterations: u32) -> Self {
        Self::IterationLimitExceeded {
            unresolved,
            iterations,
        }
    }

    /// Creates a submit timeout error.
    #[inline]
    pub fn submit_timeout(delay_ms: u64) -> Self {
        Self::SubmitTimeout { delay_ms }
    }

    /// Creates a cancellation error.
    #[inline]
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Creates a page error.
    #[inline]
    pub fn page(message: impl Into<String>) -> Self {
        Self::Page {
            message: message.into(),
        }
    }

    /// Creates a stale element error.
    #[inline]
    pub fn stale_element(element_id: ElementId) -> Self {
        Self::StaleElement { element_id }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ResolutionTimeout { .. } | Self::SubmitTimeout { .. }
        )
    }

    /// Returns `true` if element resolution ran out of budget.
    #[inline]
    #[must_use]
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::ResolutionTimeout { .. } | Self::IterationLimitExceeded { .. }
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed when the caller retries, possibly with
    /// a larger budget.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ResolutionTimeout { .. }
                | Self::IterationLimitExceeded { .. }
                | Self::SubmitTimeout { .. }
                | Self::StaleElement { .. }
        )
    }

    /// Returns the unresolved keys carried by a resolution error.
    #[must_use]
    pub fn unresolved_keys(&self) -> Option<&[String]> {
        match self {
            Self::ResolutionTimeout { unresolved, .. }
            | Self::IterationLimitExceeded { unresolved, .. } => Some(unresolved),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::page("input detached");
        assert_eq!(err.to_string(), "Page error: input detached");
    }

    #[test]
    fn test_resolution_timeout_display() {
        let err = Error::resolution_timeout(vec!["input".into(), "button".into()], 10_000);
        assert_eq!(
            err.to_string(),
            "Failed to resolve DOM elements [input, button] within 10000ms"
        );
    }

    #[test]
    fn test_iteration_limit_display() {
        let err = Error::iteration_limit_exceeded(vec!["input".into()], 3);
        assert_eq!(
            err.to_string(),
            "Failed to resolve DOM elements [input] having 3 iterations performed"
        );
    }

    #[test]
    fn test_submit_timeout_display() {
        let err = Error::submit_timeout(4000);
        assert_eq!(
            err.to_string(),
            "Failed to submit two factor token within 4000ms"
        );
    }

    #[test]
    fn test_is_timeout() {
        assert!(Error::submit_timeout(4000).is_timeout());
        assert!(Error::resolution_timeout(vec![], 1).is_timeout());
        assert!(!Error::PrefilledInput.is_timeout());
    }

    #[test]
    fn test_is_resolution_error() {
        assert!(Error::iteration_limit_exceeded(vec![], 1).is_resolution_error());
        assert!(!Error::submit_timeout(1).is_resolution_error());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::resolution_timeout(vec![], 1).is_recoverable());
        assert!(!Error::PrefilledInput.is_recoverable());
        assert!(!Error::config("test").is_recoverable());
    }

    #[test]
    fn test_unresolved_keys() {
        let err = Error::resolution_timeout(vec!["a".into()], 1);
        assert_eq!(err.unresolved_keys(), Some(&["a".to_string()][..]));
        assert!(Error::PrefilledInput.unresolved_keys().is_none());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
