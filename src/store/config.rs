//! Application config document.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::{StoreValidator, validate_document};

// ============================================================================
// Preset Catalogs
// ============================================================================

/// Supported key-derivation presets: (name, type, preset).
pub const KEY_DERIVATION_PRESETS: &[(&str, &str, &str)] = &[
    (
        "sodium.crypto_pwhash: interactive",
        "sodium.crypto_pwhash",
        "mode:interactive|algorithm:default",
    ),
    (
        "sodium.crypto_pwhash: moderate",
        "sodium.crypto_pwhash",
        "mode:moderate|algorithm:default",
    ),
    (
        "sodium.crypto_pwhash: sensitive",
        "sodium.crypto_pwhash",
        "mode:sensitive|algorithm:default",
    ),
];

/// Supported encryption presets: (name, type, preset).
pub const ENCRYPTION_PRESETS: &[(&str, &str, &str)] = &[(
    "sodium.crypto_secretbox_easy: default",
    "sodium.crypto_secretbox_easy",
    "algorithm:default",
)];

fn in_catalog(catalog: &[(&str, &str, &str)], entry: &PresetEntry) -> bool {
    catalog
        .iter()
        .any(|&(_, kind, preset)| kind == entry.kind && preset == entry.preset)
}

// ============================================================================
// Types
// ============================================================================

/// One algorithm selection: a type and its preset string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetEntry {
    /// Algorithm family (e.g. `sodium.crypto_pwhash`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Algorithm parameters (e.g. `mode:interactive|algorithm:default`).
    pub preset: String,
}

impl PresetEntry {
    /// Creates a preset entry.
    #[must_use]
    pub fn new(kind: impl Into<String>, preset: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            preset: preset.into(),
        }
    }
}

/// Key derivation and encryption used for the settings store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionPreset {
    /// Password key derivation.
    pub key_derivation: PresetEntry,
    /// Payload encryption.
    pub encryption: PresetEntry,
}

impl Default for EncryptionPreset {
    fn default() -> Self {
        Self {
            key_derivation: PresetEntry::new(
                "sodium.crypto_pwhash",
                "mode:interactive|algorithm:default",
            ),
            encryption: PresetEntry::new("sodium.crypto_secretbox_easy", "algorithm:default"),
        }
    }
}

/// Persisted log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only.
    #[default]
    Error,
    /// Warnings and errors.
    Warn,
    /// Informational.
    Info,
    /// Verbose tracing.
    Verbose,
    /// Debug output.
    Debug,
    /// Everything.
    Silly,
}

/// Window geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Left edge, if the window was moved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    /// Top edge, if the window was moved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
}

/// Main window state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Last known bounds.
    pub bounds: WindowBounds,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            bounds: WindowBounds {
                width: 1024,
                height: 768,
                x: None,
                y: None,
            },
        }
    }
}

// ============================================================================
// AppConfig
// ============================================================================

/// The persisted application config.
///
/// [`Default`] is the document written on first start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Key derivation and encryption of the settings store.
    pub encryption_preset: EncryptionPreset,
    /// Log verbosity.
    pub log_level: LogLevel,
    /// Start hidden in the tray.
    pub start_minimized: bool,
    /// Use the condensed account list layout.
    pub compact_layout: bool,
    /// Closing the window hides it instead of quitting.
    pub close_to_tray: bool,
    /// Show unread-count notifications.
    pub unread_notifications: bool,
    /// Check for new releases on start.
    pub check_for_updates_and_notify: bool,
    /// Main window state.
    pub window: WindowConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            encryption_preset: EncryptionPreset::default(),
            log_level: LogLevel::Error,
            start_minimized: true,
            compact_layout: false,
            close_to_tray: true,
            unread_notifications: true,
            check_for_updates_and_notify: true,
            window: WindowConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parses and validates a persisted config document.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`](crate::Error::Json) if the document is malformed
    /// - [`Error::Config`](crate::Error::Config) if validation fails
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        validate_document(&config, &[&ConfigEncryptionPresetValidator])?;
        Ok(config)
    }

    /// Serializes the document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) on serialization failure.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// Validator
// ============================================================================

/// Rejects encryption presets missing from the supported catalogs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigEncryptionPresetValidator;

impl StoreValidator<AppConfig> for ConfigEncryptionPresetValidator {
    fn validate(&self, data: &AppConfig) -> Option<String> {
        let preset = &data.encryption_preset;
        let mut errors = Vec::new();

        if !in_catalog(KEY_DERIVATION_PRESETS, &preset.key_derivation) {
            errors.push(format!(
                r#"Wrong "config.encryptionPreset.keyDerivation"="{}|{}" value."#,
                preset.key_derivation.kind, preset.key_derivation.preset
            ));
        }
        if !in_catalog(ENCRYPTION_PRESETS, &preset.encryption) {
            errors.push(format!(
                r#"Wrong "config.encryptionPreset.encryption"="{}|{}" value."#,
                preset.encryption.kind, preset.encryption.preset
            ));
        }

        (!errors.is_empty()).then(|| errors.join(" "))
    }
}

// ============================================================================
// Tests
// ============================================================================
