//! Element locator strategies.
//!
//! Lookups handed to the resolver usually wrap a single `By` query against a
//! [`Page`](super::Page). The resolver itself never inspects selector syntax.
//!
//! # Example
//!
//! ```ignore
//! use form_pilot::By;
//!
//! let input = page.query(&By::name("totp")).await?;
//! let button = page.query(&By::css("form button[type='submit']")).await?;
//! let link = page.query(&By::text("Use recovery code")).await?;
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// By Enum
// ============================================================================

/// Element locator strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "value")]
pub enum By {
    /// CSS selector (most common).
    ///
    /// # Example
    /// ```ignore
    /// By::Css("#login-button")
    /// By::Css("[data-testid='submit']")
    /// ```
    #[serde(rename = "css")]
    Css(String),

    /// XPath expression.
    #[serde(rename = "xpath")]
    XPath(String),

    /// Exact text content match (`textContent.trim() === value`).
    #[serde(rename = "text")]
    Text(String),

    /// Element ID (shorthand for `#id`).
    #[serde(rename = "id")]
    Id(String),

    /// Name attribute (shorthand for `[name='value']`).
    #[serde(rename = "name")]
    Name(String),

    /// Tag name.
    #[serde(rename = "tag")]
    Tag(String),
}

impl By {
    /// Creates a CSS selector.
    #[inline]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Creates an XPath selector.
    #[inline]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Creates a text content selector.
    #[inline]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Creates an ID selector.
    #[inline]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Creates a name attribute selector.
    #[inline]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Creates a tag name selector.
    #[inline]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag(tag.into())
    }

    /// Returns the strategy name.
    #[must_use]
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::Css(_) => "css",
            Self::XPath(_) => "xpath",
            Self::Text(_) => "text",
            Self::Id(_) => "id",
            Self::Name(_) => "name",
            Self::Tag(_) => "tag",
        }
    }

    /// Returns the selector value.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Css(v)
            | Self::XPath(v)
            | Self::Text(v)
            | Self::Id(v)
            | Self::Name(v)
            | Self::Tag(v) => v,
        }
    }

    /// Returns the equivalent CSS selector, if the strategy has one.
    ///
    /// `XPath` and `Text` have no CSS form and return `None`.
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self {
            Self::Css(v) | Self::Tag(v) => Some(v.clone()),
            Self::Id(v) => Some(format!("#{v}")),
            Self::Name(v) => Some(format!("[name='{v}']")),
            Self::XPath(_) | Self::Text(_) => None,
        }
    }

    /// Returns a canonical form so that equivalent locators compare equal.
    ///
    /// Strategies with a CSS form collapse to [`By::Css`].
    #[must_use]
    pub fn canonical(&self) -> By {
        match self.to_css() {
            Some(css) => By::Css(css),
            None => self.clone(),
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.strategy(), self.value())
    }
}

// ============================================================================
// From implementations for ergonomics
// ============================================================================

impl From<&str> for By {
    /// Converts a string to CSS selector (default).
    fn from(s: &str) -> Self {
        Self::Css(s.to_string())
    }
}

impl From<String> for By {
    /// Converts a string to CSS selector (default).
    fn from(s: String) -> Self {
        Self::Css(s)
    }
}

// ============================================================================
// Tests
// ============================================================================
