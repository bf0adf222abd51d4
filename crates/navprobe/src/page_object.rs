//! Page object support.
//!
//! A page object wraps the locators of one page and knows when that page is
//! ready. Actions talk to the site through page objects, never through raw
//! locators.

use crate::driver::PageDriver;
use crate::result::DriverResult;
use crate::wait::{WaitCondition, WaitOptions};
use std::collections::BTreeMap;
use url::Url;

/// A page or component of the site under test
pub trait PageObject {
    /// Name used in logs and error messages
    fn page_name(&self) -> &str;

    /// URL pattern matching this page (e.g. `/`, `/search`, `/:section/story`)
    fn url_pattern(&self) -> &str;

    /// Condition that holds once the page is ready for interaction
    fn ready_condition(&self) -> WaitCondition;

    /// Whether the page is ready right now
    fn is_loaded<D: PageDriver + ?Sized>(&self, driver: &D) -> DriverResult<bool> {
        driver.is_satisfied(&self.ready_condition())
    }

    /// Block until the page is ready
    fn wait_loaded<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
        options: &WaitOptions,
    ) -> DriverResult<()> {
        driver.wait_until(&self.ready_condition(), options)
    }

    /// Whether `url` belongs to this page
    fn matches_url(&self, url: &str) -> bool {
        UrlMatcher::new(self.url_pattern()).matches(url)
    }
}

/// URL path matcher.
///
/// Scheme, host, query and fragment are ignored; only the path is compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlMatcher {
    /// Create a matcher from a pattern
    ///
    /// Patterns support:
    /// - Literal segments: `/search`
    /// - Wildcards: `/*/story`
    /// - Named parameters: `/:section/story`
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Check if a URL matches the pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let path = path_of(url);
        let url_segments: Vec<&str> = split_path(&path).collect();
        // wildcards and parameters each consume exactly one segment
        url_segments.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(&url_segments)
                .all(|(segment, actual)| match segment {
                    UrlSegment::Literal(lit) => lit == actual,
                    UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
                })
    }

    /// Extract named parameters from a matching URL
    #[must_use]
    pub fn extract_params(&self, url: &str) -> BTreeMap<String, String> {
        let path = path_of(url);
        let url_segments: Vec<&str> = split_path(&path).collect();
        self.segments
            .iter()
            .zip(url_segments)
            .filter_map(|(segment, value)| match segment {
                UrlSegment::Parameter(name) => Some((name.clone(), value.to_string())),
                _ => None,
            })
            .collect()
    }

    /// Original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Parse an absolute URL, or a path relative to an unnamed origin
fn parse(url: &str) -> Option<Url> {
    Url::parse(url)
        .or_else(|_| Url::parse("http://localhost/").and_then(|base| base.join(url)))
        .ok()
}

/// Path component of `url`, still percent-encoded
#[must_use]
pub fn path_of(url: &str) -> String {
    parse(url).map_or_else(|| "/".to_string(), |u| u.path().to_string())
}

/// Decoded value of query parameter `name` in `url`
#[must_use]
pub fn query_param(url: &str, name: &str) -> Option<String> {
    parse(url)?
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match_ignores_origin_and_query() {
        let m = UrlMatcher::new("/search");
        assert!(m.matches("https://news.test/search?searchtext=tax"));
        assert!(m.matches("/search"));
        assert!(!m.matches("https://news.test/"));
        assert!(!m.matches("https://news.test/search/more"));
    }

    #[test]
    fn test_root_pattern() {
        let m = UrlMatcher::new("/");
        assert!(m.matches("https://news.test/"));
        assert!(m.matches("https://news.test"));
        assert!(!m.matches("https://news.test/search"));
    }

    #[test]
    fn test_wildcard_and_params() {
        let m = UrlMatcher::new("/:section/story");
        assert!(m.matches("https://news.test/US/story?id=1"));
        assert!(!m.matches("https://news.test/story"));
        let params = m.extract_params("https://news.test/US/story");
        assert_eq!(params.get("section").map(String::as_str), Some("US"));

        assert!(UrlMatcher::new("/*/story").matches("/Politics/story"));
        assert_eq!(m.pattern(), "/:section/story");
    }

    #[test]
    fn test_path_of() {
        assert_eq!(path_of("https://news.test/a/b?x=1#top"), "/a/b");
        assert_eq!(path_of("https://news.test"), "/");
        assert_eq!(path_of("/search?q=1"), "/search");
    }

    #[test]
    fn test_query_param() {
        let url = "https://news.test/search?searchtext=tax+fraud&after=week";
        assert_eq!(query_param(url, "searchtext").as_deref(), Some("tax fraud"));
        assert_eq!(query_param(url, "after").as_deref(), Some("week"));
        assert_eq!(query_param(url, "sort"), None);
        assert_eq!(query_param("https://news.test/", "q"), None);
    }

    #[test]
    fn test_query_param_decodes_reserved_and_non_ascii() {
        let url = "https://news.test/search?searchtext=R%26D+tax&after=Last+Week";
        assert_eq!(query_param(url, "searchtext").as_deref(), Some("R&D tax"));
        assert_eq!(query_param(url, "after").as_deref(), Some("Last Week"));

        let url = "https://news.test/search?searchtext=caf%C3%A9";
        assert_eq!(query_param(url, "searchtext").as_deref(), Some("café"));
    }

    #[test]
    fn test_relative_and_odd_urls() {
        assert_eq!(query_param("/search?searchtext=tax", "searchtext").as_deref(), Some("tax"));
        assert_eq!(path_of("about:blank"), "blank");
        assert!(!UrlMatcher::new("/search").matches("about:blank"));
    }
}
