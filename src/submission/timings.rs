//! Submission delays.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default wait between clicking the trigger and checking for navigation.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 4_000;

/// Default wait before the second attempt.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2_000;

// ============================================================================
// SubmissionTimings
// ============================================================================

/// Fixed delays of the submission protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubmissionTimings {
    /// Wait after clicking before comparing locations. Must be positive.
    pub settle_delay_ms: u64,

    /// Wait between a timed-out first attempt and the retry.
    pub retry_delay_ms: u64,
}

impl Default for SubmissionTimings {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionTimings {
    /// Creates timings with the defaults (4s settle, 2s retry).
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }

    /// Sets the settle delay.
    #[inline]
    #[must_use]
    pub const fn with_settle_delay_ms(mut self, settle_delay_ms: u64) -> Self {
        self.settle_delay_ms = settle_delay_ms;
        self
    }

    /// Sets the retry delay.
    #[inline]
    #[must_use]
    pub const fn with_retry_delay_ms(mut self, retry_delay_ms: u64) -> Self {
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    /// Returns the settle delay.
    #[inline]
    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Returns the retry delay.
    #[inline]
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Validates the timings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the settle delay is zero.
    pub fn validate(&self) -> Result<()> {
        if self.settle_delay_ms == 0 {
            return Err(Error::config("Submit settle delay must be positive"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
