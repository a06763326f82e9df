//! Resolution session configuration.
//!
//! # Example
//!
//! ```ignore
//! use form_pilot::ResolutionConfig;
//!
//! let config = ResolutionConfig::new()
//!     .with_timeout_ms(30_000)
//!     .with_iterations_limit(20);
//!
//! // max(300ms, 30_000ms / 50)
//! assert_eq!(config.poll_interval().as_millis(), 600);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default wall-clock budget (10 seconds).
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default floor on poll spacing.
pub const DEFAULT_DELAY_MIN_MS: u64 = 300;

/// Number of polls the cadence spreads across one timeout window.
const POLLS_PER_TIMEOUT: u32 = 50;

// ============================================================================
// ResolutionConfig
// ============================================================================

/// Budget and cadence of one resolution session.
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolutionConfig {
    /// Wall-clock budget in milliseconds. Must be positive.
    pub timeout_ms: u64,

    /// Maximum number of poll cycles; `0` means unlimited.
    pub iterations_limit: u32,

    /// Minimum spacing between two poll cycles in milliseconds. Must be positive.
    pub delay_min_ms: u64,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl ResolutionConfig {
    /// Creates a config with default settings (10s, unlimited, 300ms).
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            iterations_limit: 0,
            delay_min_ms: DEFAULT_DELAY_MIN_MS,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ResolutionConfig {
    /// Sets the wall-clock budget.
    #[inline]
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the poll cycle budget (`0` = unlimited).
    #[inline]
    #[must_use]
    pub const fn with_iterations_limit(mut self, iterations_limit: u32) -> Self {
        self.iterations_limit = iterations_limit;
        self
    }

    /// Sets the minimum poll spacing.
    #[inline]
    #[must_use]
    pub const fn with_delay_min_ms(mut self, delay_min_ms: u64) -> Self {
        self.delay_min_ms = delay_min_ms;
        self
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl ResolutionConfig {
    /// Returns the wall-clock budget.
    #[inline]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the minimum poll spacing.
    #[inline]
    #[must_use]
    pub const fn delay_min(&self) -> Duration {
        Duration::from_millis(self.delay_min_ms)
    }

    /// Returns `true` if the poll cycle count is bounded.
    #[inline]
    #[must_use]
    pub const fn is_iteration_limited(&self) -> bool {
        self.iterations_limit > 0
    }

    /// Returns the spacing between poll cycles: `max(delay_min, timeout / 50)`.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.delay_min().max(self.timeout() / POLLS_PER_TIMEOUT)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the timeout or the delay floor is zero.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(Error::config("Resolution timeout must be positive"));
        }
        if self.delay_min_ms == 0 {
            return Err(Error::config("Minimum poll delay must be positive"));
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

    use proptest::prelude::*;

    #[test]
    fn test_new_creates_default() {
        let config = ResolutionConfig::new();
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.iterations_limit, 0);
        assert_eq!(config.delay_min_ms, 300);
        assert!(!config.is_iteration_limited());
        assert_eq!(config, ResolutionConfig::default());
    }

    #[test]
    fn test_builder_chain() {
        let config = ResolutionConfig::new()
            .with_timeout_ms(2_000)
            .with_iterations_limit(5)
            .with_delay_min_ms(50);

        assert_eq!(config.timeout(), Duration::from_secs(2));
        assert_eq!(config.delay_min(), Duration::from_millis(50));
        assert!(config.is_iteration_limited());
    }

    #[test]
    fn test_poll_interval_uses_floor() {
        let config = ResolutionConfig::new();
        assert_eq!(config.poll_interval(), Duration::from_millis(300));
    }

    #[test]
    fn test_poll_interval_scales_with_timeout() {
        let config = ResolutionConfig::new().with_timeout_ms(100_000);
        assert_eq!(config.poll_interval(), Duration::from_millis(2_000));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ResolutionConfig = serde_json::from_str(r#"{"iterationsLimit": 3}"#).unwrap();
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.iterations_limit, 3);
        assert_eq!(config.delay_min_ms, DEFAULT_DELAY_MIN_MS);
    }

    #[test]
    fn test_validate_valid() {
        assert!(ResolutionConfig::new().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let err = ResolutionConfig::new().with_timeout_ms(0).validate().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_validate_zero_delay() {
        assert!(ResolutionConfig::new().with_delay_min_ms(0).validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_poll_interval_never_below_floor(timeout in 1u64..10_000_000, floor in 1u64..100_000) {
            let config = ResolutionConfig::new().with_timeout_ms(timeout).with_delay_min_ms(floor);
            let interval = config.poll_interval();
            prop_assert!(interval >= config.delay_min());
            prop_assert!(interval >= config.timeout() / 50);
            prop_assert!(interval == config.delay_min() || interval == config.timeout() / 50);
        }
    }
}
