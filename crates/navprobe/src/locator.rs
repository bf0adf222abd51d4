//! Locator abstraction for element selection.
//!
//! Locators are plain values handed to a [`crate::driver::PageDriver`]; how a
//! driver resolves them is its own business.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector for locating elements on a page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Locator {
    /// CSS selector (e.g., ".ContentRoll__Item")
    Css(String),
    /// Form control `name` attribute (e.g., "after")
    Name(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
}

impl Locator {
    /// Create a CSS locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a name-attribute locator
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Create a test ID locator
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Raw selector text without the strategy prefix
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Css(s) | Self::Name(s) | Self::TestId(s) => s,
        }
    }

    /// Equivalent CSS selector
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Css(s) => s.clone(),
            Self::Name(n) => format!("[name={n:?}]"),
            Self::TestId(id) => format!("[data-testid={id:?}]"),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css:{s}"),
            Self::Name(n) => write!(f, "name:{n}"),
            Self::TestId(id) => write!(f, "testid:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_strategy() {
        assert_eq!(Locator::css(".a.b").to_string(), "css:.a.b");
        assert_eq!(Locator::name("after").to_string(), "name:after");
        assert_eq!(Locator::test_id("logo").to_string(), "testid:logo");
    }

    #[test]
    fn test_to_css() {
        assert_eq!(Locator::name("sort").to_css(), "[name=\"sort\"]");
        assert_eq!(Locator::test_id("x").to_css(), "[data-testid=\"x\"]");
        assert_eq!(Locator::css("h2 a").to_css(), "h2 a");
    }

    #[test]
    fn test_value() {
        assert_eq!(Locator::name("after").value(), "after");
    }
}
