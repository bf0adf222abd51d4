//! PageDriver - abstract browser automation capability.
//!
//! navprobe does not drive a browser itself. Models talk to the page through
//! [`PageDriver`], and acquire a fresh session through [`DriverLauncher`].
//! [`crate::mock::SimulatedSite`] is the in-tree implementation.

use crate::locator::Locator;
use crate::result::{DriverError, DriverResult};
use crate::wait::{poll_until, WaitCondition, WaitOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of a DOM element returned by a driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Driver-assigned handle
    pub id: String,
    /// Element tag name
    pub tag_name: String,
    /// Rendered text content
    pub text: String,
    /// Attributes
    pub attributes: BTreeMap<String, String>,
    /// Whether the element is displayed
    pub displayed: bool,
}

impl Element {
    /// Create a new visible element with no text
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
            text: String::new(),
            attributes: BTreeMap::new(),
            displayed: true,
        }
    }

    /// Set text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Mark as not displayed
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Rendered text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Attribute value, if present
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether the element is displayed
    #[must_use]
    pub const fn is_displayed(&self) -> bool {
        self.displayed
    }
}

/// Browser configuration handed to a [`DriverLauncher`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Maximize the window after launch
    pub maximize: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: false,
            maximize: true,
        }
    }
}

impl DriverConfig {
    /// Create a new driver config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }
}

/// Browser automation capability consumed by models and page accessors
pub trait PageDriver {
    /// Load `url` in the current tab
    fn navigate(&mut self, url: &str) -> DriverResult<()>;

    /// All elements matching `locator`; empty when nothing matches
    fn find_all(&self, locator: &Locator) -> DriverResult<Vec<Element>>;

    /// Current page URL
    fn current_url(&self) -> DriverResult<String>;

    /// Click an element
    fn click(&mut self, element: &Element) -> DriverResult<()>;

    /// Type text into an input element
    fn type_text(&mut self, element: &Element, text: &str) -> DriverResult<()>;

    /// Submit the form owning `element`
    fn submit(&mut self, element: &Element) -> DriverResult<()>;

    /// Choose an option of a `<select>` by its visible text
    fn select_option(&mut self, element: &Element, visible_text: &str) -> DriverResult<()>;

    /// Release the browser session
    fn quit(&mut self) -> DriverResult<()>;

    /// First element matching `locator`, or [`DriverError::NotFound`]
    fn find(&self, locator: &Locator) -> DriverResult<Element> {
        self.find_all(locator)?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::not_found(locator))
    }

    /// Evaluate `condition` once against the current page
    fn is_satisfied(&self, condition: &WaitCondition) -> DriverResult<bool> {
        Ok(match condition {
            WaitCondition::ElementPresent(l) => !self.find_all(l)?.is_empty(),
            WaitCondition::ElementVisible(l) => self.find_all(l)?.iter().any(Element::is_displayed),
            WaitCondition::UrlIs(url) => self.current_url()? == *url,
            WaitCondition::UrlContains(fragment) => self.current_url()?.contains(fragment.as_str()),
        })
    }

    /// Block until `condition` holds, failing with [`DriverError::Timeout`]
    fn wait_until(&mut self, condition: &WaitCondition, options: &WaitOptions) -> DriverResult<()> {
        let description = condition.to_string();
        poll_until(|| self.is_satisfied(condition), &description, options).map(|_| ())
    }
}

/// Acquires driver sessions
pub trait DriverLauncher {
    /// Driver produced by this launcher
    type Driver: PageDriver;

    /// Start a new browser session
    fn launch(&mut self, config: &DriverConfig) -> DriverResult<Self::Driver>;
}
