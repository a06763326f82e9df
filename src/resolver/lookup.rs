//! Lookup sets and resolved element sets.

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::ops::Index;

use futures_util::future::{self, BoxFuture, FutureExt};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Error, Result};
use crate::page::{By, Page};

// ============================================================================
// Types
// ============================================================================

/// Future returned by one lookup invocation.
pub type LookupFuture<'a, E> = BoxFuture<'a, Result<Option<E>>>;

/// A zero-argument lookup: finds one element or reports it absent.
pub type Lookup<'a, E> = Box<dyn Fn() -> LookupFuture<'a, E> + Send + Sync + 'a>;

// ============================================================================
// LookupSet
// ============================================================================

/// Named element lookups resolved together by a [`Resolver`](super::Resolver).
///
/// Keys are unique. Lookups are polled in insertion order.
///
/// # Example
///
/// ```ignore
/// let mut lookups = LookupSet::new();
/// lookups
///     .query("input", &page, By::name("totp"))?
///     .query("button", &page, By::css("button[type='submit']"))?;
/// ```
pub struct LookupSet<'a, E> {
    entries: Vec<(String, Lookup<'a, E>)>,
    keys: FxHashSet<String>,
}

impl<E> Default for LookupSet<'_, E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            keys: FxHashSet::default(),
        }
    }
}

impl<E> std::fmt::Debug for LookupSet<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupSet")
            .field(
                "keys",
                &self.entries.iter().map(|(key, _)| key).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<'a, E: Send + 'a> LookupSet<'a, E> {
    /// Creates an empty lookup set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an asynchronous lookup under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `key` is already present.
    pub fn insert<F, Fut>(&mut self, key: impl Into<String>, lookup: F) -> Result<&mut Self>
    where
        F: Fn() -> Fut + Send + Sync + 'a,
        Fut: Future<Output = Result<Option<E>>> + Send + 'a,
    {
        let key = key.into();
        if !self.keys.insert(key.clone()) {
            return Err(Error::invalid_argument(format!(
                "Duplicate lookup key: {key}"
            )));
        }
        let boxed: Lookup<'a, E> = Box::new(move || lookup().boxed());
        self.entries.push((key, boxed));
        Ok(self)
    }

    /// Adds a synchronous lookup under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `key` is already present.
    pub fn insert_fn<F>(&mut self, key: impl Into<String>, lookup: F) -> Result<&mut Self>
    where
        F: Fn() -> Option<E> + Send + Sync + 'a,
    {
        self.insert(key, move || future::ready(Ok(lookup())))
    }

    /// Adds a lookup that runs `page.query(by)` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `key` is already present.
    pub fn query<P>(&mut self, key: impl Into<String>, page: &'a P, by: impl Into<By>) -> Result<&mut Self>
    where
        P: Page<Element = E>,
    {
        let by = by.into();
        self.insert(key, move || {
            let by = by.clone();
            async move { page.query(&by).await }
        })
    }

    /// Returns the keys in poll order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Returns `true` if `key` is present.
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Returns the number of lookups.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no lookups.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<(String, Lookup<'a, E>)> {
        self.entries
    }
}

// ============================================================================
// ResolvedSet
// ============================================================================

/// Every key of a [`LookupSet`] mapped to the element its lookup returned.
///
/// Only produced once all keys resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSet<E> {
    elements: FxHashMap<String, E>,
}

impl<E> ResolvedSet<E> {
    pub(crate) fn new(elements: FxHashMap<String, E>) -> Self {
        Self { elements }
    }

    /// Returns the element resolved for `key`.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&E> {
        self.elements.get(key)
    }

    /// Returns the element resolved for `key`, or an error naming the key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `key` was not part of the lookup set.
    pub fn require(&self, key: &str) -> Result<&E> {
        self.get(key)
            .ok_or_else(|| Error::invalid_argument(format!("No resolved element for key: {key}")))
    }

    /// Returns `true` if `key` was resolved.
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.elements.contains_key(key)
    }

    /// Returns the number of resolved elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the set is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates over `(key, element)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &E)> {
        self.elements.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Consumes the set, returning the underlying map.
    #[must_use]
    pub fn into_inner(self) -> FxHashMap<String, E> {
        self.elements
    }
}

impl<E> Index<&str> for ResolvedSet<E> {
    type Output = E;

    /// Panics if `key` was not part of the lookup set.
    fn index(&self, key: &str) -> &E {
        &self.elements[key]
    }
}

// ============================================================================
// Tests
// ============================================================================
