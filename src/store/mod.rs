//! Persisted store documents and their validators.
//!
//! The store itself (file layout, encryption, atomic writes) lives outside
//! this crate. What lives here are the two documents it persists, their
//! initial values, and the pure validators it runs before accepting a write.
//!
//! | Document | Initial value | Validator |
//! |----------|---------------|-----------|
//! | [`AppConfig`] | [`AppConfig::default`] | [`ConfigEncryptionPresetValidator`] |
//! | [`Settings`] | [`Settings::default`] | [`AccountLoginUniquenessValidator`] |
//!
//! # Example
//!
//! ```ignore
//! use form_pilot::store::{AppConfig, ConfigEncryptionPresetValidator, StoreValidator};
//!
//! let config = AppConfig::from_json(&std::fs::read_to_string("config.json")?)?;
//! assert!(ConfigEncryptionPresetValidator.validate(&config).is_none());
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod config;
mod settings;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{
    AppConfig, ConfigEncryptionPresetValidator, ENCRYPTION_PRESETS, EncryptionPreset,
    KEY_DERIVATION_PRESETS, LogLevel, PresetEntry, WindowBounds, WindowConfig,
};
pub use settings::{AccountConfig, AccountLoginUniquenessValidator, Settings};

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};

// ============================================================================
// StoreValidator
// ============================================================================

/// A pure check run against a whole persisted document.
pub trait StoreValidator<T>: Send + Sync {
    /// Returns `None` if `data` is valid, otherwise a human-readable message.
    fn validate(&self, data: &T) -> Option<String>;
}

/// Runs `validators` in order and fails with the first message.
///
/// # Errors
///
/// Returns [`Error::Config`] carrying the first validator message.
pub fn validate_document<T>(data: &T, validators: &[&dyn StoreValidator<T>]) -> Result<()> {
    match validators.iter().find_map(|v| v.validate(data)) {
        Some(message) => Err(Error::config(message)),
        None => Ok(()),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Always(&'static str);

    impl StoreValidator<u32> for Always {
        fn validate(&self, _data: &u32) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    struct Never;

    impl StoreValidator<u32> for Never {
        fn validate(&self, _data: &u32) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_validate_document_first_message_wins() {
        let err = validate_document(&1, &[&Never, &Always("first"), &Always("second")]).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: first");
    }

    #[test]
    fn test_validate_document_passes() {
        assert!(validate_document(&1, &[&Never]).is_ok());
        assert!(validate_document::<u32>(&1, &[]).is_ok());
    }
}
