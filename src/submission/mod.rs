//! Retry-driven TOTP form submission.
//!
//! Drives a fill → click → settle → verify cycle against elements the
//! [`resolver`](crate::resolver) has already found.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `timings` | [`SubmissionTimings`]: settle and retry delays |
//! | `core` | [`TotpSubmitter`] protocol and [`fill_input_value`] |

// ============================================================================
// Submodules
// ============================================================================

mod core;
mod timings;

// ============================================================================
// Re-exports
// ============================================================================

pub use core::{
    SubmissionContext, TokenSource, TotpSubmitter, fill_input_value, submit_totp_token,
};
pub use timings::{DEFAULT_RETRY_DELAY_MS, DEFAULT_SETTLE_DELAY_MS, SubmissionTimings};
