//! Wait mechanisms for page synchronization.
//!
//! Actions block on a [`WaitCondition`] after interacting with the page. The
//! wait is a bounded poll; running out of time is a hard failure.

use crate::locator::Locator;
use crate::result::{DriverError, DriverResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (250ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Condition a driver can be asked to wait for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    /// At least one element matches
    ElementPresent(Locator),
    /// At least one matching element is displayed
    ElementVisible(Locator),
    /// Current URL equals the given string
    UrlIs(String),
    /// Current URL contains the given fragment
    UrlContains(String),
}

impl WaitCondition {
    /// Element presence
    #[must_use]
    pub fn present(locator: &Locator) -> Self {
        Self::ElementPresent(locator.clone())
    }

    /// Exact URL
    #[must_use]
    pub fn url_is(url: impl Into<String>) -> Self {
        Self::UrlIs(url.into())
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElementPresent(l) => write!(f, "presence of {l}"),
            Self::ElementVisible(l) => write!(f, "visibility of {l}"),
            Self::UrlIs(u) => write!(f, "url to be {u}"),
            Self::UrlContains(u) => write!(f, "url containing {u}"),
        }
    }
}

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Poll `check` until it returns `true` or the timeout elapses.
///
/// The check runs at least once, even with a zero timeout. Errors from the
/// check propagate immediately. Returns the time spent waiting.
pub fn poll_until<F>(mut check: F, description: &str, options: &WaitOptions) -> DriverResult<Duration>
where
    F: FnMut() -> DriverResult<bool>,
{
    let start = Instant::now();
    loop {
        if check()? {
            return Ok(start.elapsed());
        }
        if start.elapsed() >= options.timeout() {
            return Err(DriverError::Timeout {
                condition: description.to_string(),
                ms: options.timeout_ms,
            });
        }
        std::thread::sleep(options.poll_interval());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_options_default() {
        let opts = WaitOptions::default();
        assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
        assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_wait_options_chained() {
        let opts = WaitOptions::new().with_timeout(500).with_poll_interval(5);
        assert_eq!(opts.timeout(), Duration::from_millis(500));
        assert_eq!(opts.poll_interval(), Duration::from_millis(5));
    }

    #[test]
    fn test_poll_until_succeeds_after_retries() {
        let mut calls = 0;
        let opts = WaitOptions::new().with_timeout(1_000).with_poll_interval(1);
        poll_until(
            || {
                calls += 1;
                Ok(calls >= 3)
            },
            "third call",
            &opts,
        )
        .unwrap();
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_poll_until_times_out() {
        let opts = WaitOptions::new().with_timeout(5).with_poll_interval(1);
        let err = poll_until(|| Ok(false), "never", &opts).unwrap_err();
        assert_eq!(
            err,
            DriverError::Timeout {
                condition: "never".into(),
                ms: 5
            }
        );
    }

    #[test]
    fn test_poll_until_checks_once_with_zero_timeout() {
        let opts = WaitOptions::new().with_timeout(0);
        assert!(poll_until(|| Ok(true), "now", &opts).is_ok());
    }

    #[test]
    fn test_poll_until_propagates_check_error() {
        let opts = WaitOptions::new().with_timeout(1_000);
        let err = poll_until(|| Err(DriverError::SessionClosed), "closed", &opts).unwrap_err();
        assert_eq!(err, DriverError::SessionClosed);
    }

    #[test]
    fn test_condition_display() {
        let c = WaitCondition::present(&Locator::css(".ContentRoll__Item"));
        assert_eq!(c.to_string(), "presence of css:.ContentRoll__Item");
        assert_eq!(WaitCondition::url_is("https://x/").to_string(), "url to be https://x/");
    }
}
