//! Settings document: the configured accounts.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

use super::{StoreValidator, validate_document};

// ============================================================================
// Types
// ============================================================================

/// One configured account.
///
/// Only `login` is interpreted here. Every other field is carried through
/// untouched so a round-trip never drops data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Account login, unique across the document.
    pub login: String,

    /// Remaining account fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AccountConfig {
    /// Creates an account with only a login.
    #[must_use]
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            extra: Map::new(),
        }
    }
}

/// The persisted settings document.
///
/// [`Default`] is the document written on first start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Configured accounts, in display order.
    pub accounts: Vec<AccountConfig>,
}

impl Settings {
    /// Parses and validates a persisted settings document.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`](crate::Error::Json) if the document is malformed
    /// - [`Error::Config`](crate::Error::Config) if validation fails
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        validate_document(&settings, &[&AccountLoginUniquenessValidator])?;
        Ok(settings)
    }

    /// Serializes the document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) on serialization failure.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Logins that appear more than once, each listed once, in the order the
    /// repeat was first seen.
    #[must_use]
    pub fn duplicated_logins(&self) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        let mut reported = FxHashSet::default();
        let mut duplicates = Vec::new();

        for account in &self.accounts {
            let login = account.login.as_str();
            if !seen.insert(login) && reported.insert(login) {
                duplicates.push(login);
            }
        }

        duplicates
    }
}

// ============================================================================
// Validator
// ============================================================================

/// Rejects documents where two accounts share a login.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountLoginUniquenessValidator;

impl StoreValidator<Settings> for AccountLoginUniquenessValidator {
    fn validate(&self, data: &Settings) -> Option<String> {
        let duplicates = data.duplicated_logins();

        (!duplicates.is_empty()).then(|| {
            format!(
                "Duplicate accounts identified. Duplicated logins: {}.",
                duplicates.join(", ")
            )
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
