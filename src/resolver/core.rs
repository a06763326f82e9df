//! Bounded polling resolver.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use rustc_hash::FxHashMap;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::SessionId;

use super::config::ResolutionConfig;
use super::lookup::{Lookup, LookupSet, ResolvedSet};

// ============================================================================
// ResolutionState
// ============================================================================

/// State of a resolution session after a poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionState {
    /// Some keys are unresolved and budget remains.
    Polling,
    /// Every key resolved.
    Resolved,
    /// Wall-clock budget exhausted.
    TimedOut,
    /// Poll cycle budget exhausted.
    IterationExceeded,
    /// Aborted through the cancellation token.
    Cancelled,
}

impl ResolutionState {
    /// Returns `true` once the session can no longer change state.
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Polling)
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves a [`LookupSet`] by polling it until every key yields an element.
///
/// Each cycle invokes the lookups of still-unresolved keys once, in key
/// order. A key's lookup is never invoked again after it returned an
/// element. Cycles are strictly sequential, spaced by
/// [`ResolutionConfig::poll_interval`].
///
/// Termination is checked after every cycle, in priority order:
///
/// 1. all keys resolved: success
/// 2. iteration limit set and reached: [`Error::IterationLimitExceeded`]
/// 3. elapsed time above the timeout: [`Error::ResolutionTimeout`]
/// 4. otherwise wait one interval and poll again
///
/// Nothing found during a failed session is returned.
///
/// # Example
///
/// ```ignore
/// use form_pilot::{By, LookupSet, ResolutionConfig, Resolver};
///
/// let mut lookups = LookupSet::new();
/// lookups
///     .query("input", &page, By::name("totp"))?
///     .query("button", &page, By::css("button[type='submit']"))?;
///
/// let resolved = Resolver::with_config(ResolutionConfig::new().with_timeout_ms(5_000))
///     .resolve(lookups)
///     .await?;
/// let input = &resolved["input"];
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolver {
    config: ResolutionConfig,
}

impl Resolver {
    /// Creates a resolver with the default configuration.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            config: ResolutionConfig::new(),
        }
    }

    /// Creates a resolver with a custom configuration.
    #[inline]
    #[must_use]
    pub const fn with_config(config: ResolutionConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    /// Resolves every lookup or fails.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the configuration is invalid
    /// - [`Error::IterationLimitExceeded`] if the cycle budget runs out
    /// - [`Error::ResolutionTimeout`] if the time budget runs out
    /// - any error returned by a lookup, unmodified
    pub async fn resolve<'a, E: Send + 'a>(
        &self,
        lookups: LookupSet<'a, E>,
    ) -> Result<ResolvedSet<E>> {
        self.run(lookups, None).await
    }

    /// Like [`resolve`](Self::resolve), but aborts with [`Error::Cancelled`]
    /// when `cancel` fires during a wait between cycles.
    pub async fn resolve_with_cancel<'a, E: Send + 'a>(
        &self,
        lookups: LookupSet<'a, E>,
        cancel: &CancellationToken,
    ) -> Result<ResolvedSet<E>> {
        self.run(lookups, Some(cancel)).await
    }

    async fn run<'a, E: Send + 'a>(
        &self,
        lookups: LookupSet<'a, E>,
        cancel: Option<&CancellationToken>,
    ) -> Result<ResolvedSet<E>> {
        self.config.validate()?;

        let mut session = Session::start(lookups, self.config);
        let interval = self.config.poll_interval();

        debug!(
            session_id = %session.id,
            keys = session.entries.len(),
            timeout_ms = self.config.timeout_ms,
            iterations_limit = self.config.iterations_limit,
            interval_ms = interval.as_millis() as u64,
            "Resolution started"
        );

        loop {
            session.poll().await?;
            session.state = session.evaluate();
            if session.state.is_terminal() {
                break;
            }
            if !wait(interval, cancel).await {
                session.state = ResolutionState::Cancelled;
                break;
            }
        }

        session.finish()
    }
}

/// Resolves `lookups` with `config`, falling back to defaults when `None`.
///
/// # Errors
///
/// See [`Resolver::resolve`].
pub async fn resolve<'a, E: Send + 'a>(
    lookups: LookupSet<'a, E>,
    config: Option<ResolutionConfig>,
) -> Result<ResolvedSet<E>> {
    Resolver::with_config(config.unwrap_or_default())
        .resolve(lookups)
        .await
}

/// Sleeps for `interval`. Returns `false` if cancelled first.
async fn wait(interval: Duration, cancel: Option<&CancellationToken>) -> bool {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            () = token.cancelled() => false,
            () = sleep(interval) => true,
        },
        None => {
            sleep(interval).await;
            true
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// Mutable state of one resolution session.
struct Session<'a, E> {
    id: SessionId,
    config: ResolutionConfig,
    entries: Vec<(String, Lookup<'a, E>)>,
    found: Vec<Option<E>>,
    iteration: u32,
    started: Instant,
    state: ResolutionState,
}

impl<'a, E> Session<'a, E> {
    fn start(lookups: LookupSet<'a, E>, config: ResolutionConfig) -> Self
    where
        E: Send + 'a,
    {
        let entries = lookups.into_entries();
        let found = entries.iter().map(|_| None).collect();

        Self {
            id: SessionId::generate(),
            config,
            entries,
            found,
            iteration: 0,
            started: Instant::now(),
            state: ResolutionState::Polling,
        }
    }

    /// Runs one cycle over the unresolved keys.
    async fn poll(&mut self) -> Result<()> {
        self.iteration += 1;

        for ((key, lookup), slot) in self.entries.iter().zip(self.found.iter_mut()) {
            if slot.is_some() {
                continue;
            }
            if let Some(element) = lookup().await? {
                trace!(session_id = %self.id, key = %key, iteration = self.iteration, "Element resolved");
                *slot = Some(element);
            }
        }
        Ok(())
    }

    fn evaluate(&self) -> ResolutionState {
        if self.found.iter().all(Option::is_some) {
            ResolutionState::Resolved
        } else if self.config.is_iteration_limited()
            && self.iteration >= self.config.iterations_limit
        {
            ResolutionState::IterationExceeded
        } else if self.started.elapsed() > self.config.timeout() {
            ResolutionState::TimedOut
        } else {
            ResolutionState::Polling
        }
    }

    fn unresolved_keys(&self) -> Vec<String> {
        self.entries
            .iter()
            .zip(&self.found)
            .filter(|(_, slot)| slot.is_none())
            .map(|((key, _), _)| key.clone())
            .collect()
    }

    fn finish(self) -> Result<ResolvedSet<E>> {
        let error = match self.state {
            ResolutionState::Resolved => {
                debug!(session_id = %self.id, iterations = self.iteration, "Resolution complete");
                let elements: FxHashMap<String, E> = self
                    .entries
                    .into_iter()
                    .zip(self.found)
                    .filter_map(|((key, _), slot)| slot.map(|element| (key, element)))
                    .collect();
                return Ok(ResolvedSet::new(elements));
            }
            ResolutionState::IterationExceeded => {
                Error::iteration_limit_exceeded(self.unresolved_keys(), self.iteration)
            }
            // Polling never reaches here: the loop only breaks on terminal states.
            ResolutionState::TimedOut | ResolutionState::Polling => {
                Error::resolution_timeout(self.unresolved_keys(), self.config.timeout_ms)
            }
            ResolutionState::Cancelled => Error::cancelled(format!(
                "resolution of [{}]",
                self.unresolved_keys().join(", ")
            )),
        };

        warn!(session_id = %self.id, iterations = self.iteration, error = %error, "Resolution failed");
        Err(error)
    }
}

// ============================================================================
// Tests
// ============================================================================
