//! Bounded element resolution.
//!
//! Polls a named set of lookups on a fixed cadence until every one of them
//! returns an element, or a time / iteration budget runs out.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `config` | [`ResolutionConfig`]: budgets and cadence |
//! | `lookup` | [`LookupSet`] input and [`ResolvedSet`] output |
//! | `core` | [`Resolver`] polling state machine |

// ============================================================================
// Submodules
// ============================================================================

mod config;
mod core;
mod lookup;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{DEFAULT_DELAY_MIN_MS, DEFAULT_TIMEOUT_MS, ResolutionConfig};
pub use core::{ResolutionState, Resolver, resolve};
pub use lookup::{Lookup, LookupFuture, LookupSet, ResolvedSet};
