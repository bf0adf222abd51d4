//! Simulated news site.
//!
//! An in-memory [`PageDriver`] rendering the homepage, article and search
//! pages the news model expects, with knobs for the failures worth testing.
//! Pages are static once rendered, so waits check once and fail immediately
//! instead of polling.

use crate::driver::{DriverConfig, DriverLauncher, Element, PageDriver};
use crate::locator::Locator;
use crate::news::pages::{ArticlePage, HomePage, SearchPage};
use crate::page_object::{path_of, query_param, UrlMatcher};
use crate::result::{DriverError, DriverResult};
use crate::wait::{WaitCondition, WaitOptions};
use std::cell::RefCell;
use std::rc::Rc;
use url::Url;

/// Date filter options offered by the search page
pub const DATE_FILTERS: &[&str] = &["Last 24 Hours", "Last Week", "Last Month", "Last Year"];

/// Sort options offered by the search page
pub const SORT_OPTIONS: &[&str] = &["Relevance", "Newest"];

const HOME_ARTICLE_BASE: u32 = 1000;
const SEARCH_ARTICLE_BASE: u32 = 2000;

/// How the simulated site behaves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteBehavior {
    /// Article headings on the homepage
    pub headline_count: usize,
    /// Results for any search
    pub result_count: usize,
    /// Every search comes back empty
    pub zero_results: bool,
    /// Article pages never render their headline
    pub missing_article_title: bool,
    /// The launcher refuses to start a browser
    pub fail_launch: bool,
    /// Closing a session reports an error
    pub fail_quit: bool,
    /// Loading the homepage ends up at this URL instead
    pub landing_redirect: Option<String>,
}

impl Default for SiteBehavior {
    fn default() -> Self {
        Self {
            headline_count: 12,
            result_count: 10,
            zero_results: false,
            missing_article_title: false,
            fail_launch: false,
            fail_quit: false,
            landing_redirect: None,
        }
    }
}

impl SiteBehavior {
    /// Default behaviour
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every search return nothing
    #[must_use]
    pub const fn with_zero_results(mut self) -> Self {
        self.zero_results = true;
        self
    }

    /// Drop the headline from article pages
    #[must_use]
    pub const fn with_missing_article_title(mut self) -> Self {
        self.missing_article_title = true;
        self
    }

    /// Refuse to launch
    #[must_use]
    pub const fn with_failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    /// Report errors on quit
    #[must_use]
    pub const fn with_failing_quit(mut self) -> Self {
        self.fail_quit = true;
        self
    }

    /// Redirect the homepage elsewhere
    #[must_use]
    pub fn with_landing_redirect(mut self, url: impl Into<String>) -> Self {
        self.landing_redirect = Some(url.into());
        self
    }

    /// Set the number of search results
    #[must_use]
    pub const fn with_result_count(mut self, count: usize) -> Self {
        self.result_count = count;
        self
    }
}

/// Session lifecycle event, in order of occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Session `n` started
    Launched(usize),
    /// Session `n` was closed
    Quit(usize),
}

type EventLog = Rc<RefCell<Vec<SessionEvent>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Page {
    Blank,
    Home,
    Article { id: u32 },
    Search { term: String, filter: Option<String> },
    Missing,
}

/// In-memory browser session on the simulated site
#[derive(Debug)]
pub struct SimulatedSite {
    base_url: String,
    behavior: SiteBehavior,
    url: String,
    page: Page,
    typed: String,
    sort: String,
    session: usize,
    events: EventLog,
    closed: bool,
}

impl SimulatedSite {
    /// Open a standalone session on a blank page
    #[must_use]
    pub fn new(base_url: impl Into<String>, behavior: SiteBehavior) -> Self {
        Self::with_log(base_url.into(), behavior, 1, Rc::default())
    }

    fn with_log(base_url: String, behavior: SiteBehavior, session: usize, events: EventLog) -> Self {
        Self {
            base_url,
            behavior,
            url: "about:blank".to_string(),
            page: Page::Blank,
            typed: String::new(),
            sort: SORT_OPTIONS[0].to_string(),
            session,
            events,
            closed: false,
        }
    }

    /// Session number assigned by the launcher
    #[must_use]
    pub const fn session(&self) -> usize {
        self.session
    }

    /// Whether `quit` has been called
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Current sort order
    #[must_use]
    pub fn sort_order(&self) -> &str {
        &self.sort
    }

    fn ensure_open(&self) -> DriverResult<()> {
        if self.closed {
            Err(DriverError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn article_url(&self, id: u32) -> String {
        format!("{}US/story?id={id}", self.base_url)
    }

    fn search_url(&self, term: &str, filter: Option<&str>) -> DriverResult<String> {
        let mut url = Url::parse(&self.base_url)
            .and_then(|base| base.join("search"))
            .map_err(|e| DriverError::Navigation {
                url: self.base_url.clone(),
                message: e.to_string(),
            })?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("searchtext", term);
            if let Some(filter) = filter {
                query.append_pair("after", filter);
            }
        }
        Ok(url.into())
    }

    fn article_title(id: u32) -> String {
        if id >= SEARCH_ARTICLE_BASE {
            format!("Search result {}", id - SEARCH_ARTICLE_BASE + 1)
        } else {
            format!("Top story {}", id - HOME_ARTICLE_BASE + 1)
        }
    }

    fn result_total(&self, filter: Option<&str>) -> usize {
        let all = if self.behavior.zero_results {
            0
        } else {
            self.behavior.result_count
        };
        match filter {
            Some("Last 24 Hours") => all / 4,
            Some("Last Week") => (all + 1) / 2,
            _ => all,
        }
    }

    fn route(&self, url: &str) -> DriverResult<(String, Page)> {
        let home = self.base_url.trim_end_matches('/');
        if url.trim_end_matches('/') == home {
            return Ok(match &self.behavior.landing_redirect {
                Some(redirect) => (redirect.clone(), Page::Missing),
                None => (self.base_url.clone(), Page::Home),
            });
        }
        if !url.starts_with(&self.base_url) {
            return Err(DriverError::Navigation {
                url: url.to_string(),
                message: "outside the simulated site".to_string(),
            });
        }

        let page = if path_of(url) == "/search" {
            Page::Search {
                term: query_param(url, "searchtext").unwrap_or_default(),
                filter: query_param(url, "after"),
            }
        } else if UrlMatcher::new("/:section/story").matches(url) {
            query_param(url, "id")
                .and_then(|id| id.parse().ok())
                .map_or(Page::Missing, |id| Page::Article { id })
        } else {
            Page::Missing
        };
        Ok((url.to_string(), page))
    }

    fn render(&self) -> Vec<(Locator, Element)> {
        let mut out = Vec::new();
        let mut next = 0usize;
        let mut add = |out: &mut Vec<(Locator, Element)>, locator: Locator, tag: &str| {
            next += 1;
            out.push((locator, Element::new(format!("e{next}"), tag)));
        };

        if self.page == Page::Blank {
            return out;
        }

        // header, on every page
        add(&mut out, Locator::test_id(HomePage::HOME_LINK), "a");
        with_last(&mut out, |e| e.with_attribute("href", self.base_url.clone()));
        add(&mut out, Locator::name(HomePage::SEARCH_INPUT), "input");
        with_last(&mut out, |e| e.with_attribute("name", HomePage::SEARCH_INPUT));

        match &self.page {
            Page::Blank => {}
            Page::Home => {
                add(&mut out, Locator::css(HomePage::MARKER), "div");
                for i in 0..self.behavior.headline_count {
                    let id = HOME_ARTICLE_BASE + i as u32;
                    add(&mut out, Locator::css(HomePage::HEADLINES), "a");
                    with_last(&mut out, |e| {
                        e.with_text(Self::article_title(id))
                            .with_attribute("href", self.article_url(id))
                    });
                }
            }
            Page::Article { id } => {
                if !self.behavior.missing_article_title {
                    add(&mut out, Locator::css(ArticlePage::TITLE), "h1");
                    with_last(&mut out, |e| e.with_text(Self::article_title(*id)));
                }
                add(&mut out, Locator::css(ArticlePage::AUTHOR), "span");
                with_last(&mut out, |e| e.with_text("By Staff Reporter"));
                add(&mut out, Locator::css(ArticlePage::TIMESTAMP), "time");
                with_last(&mut out, |e| e.with_text("October 14, 2026, 9:00 AM"));
                add(&mut out, Locator::css(ArticlePage::BODY), "article");
                with_last(&mut out, |e| e.with_text("Story body."));
                for _ in 0..3 {
                    add(&mut out, Locator::css(ArticlePage::SHARE_BUTTONS), "button");
                }
                for _ in 0..5 {
                    add(&mut out, Locator::css(ArticlePage::POPULAR_ARTICLES), "li");
                }
            }
            Page::Search { term, filter } => {
                let total = self.result_total(filter.as_deref());
                add(&mut out, Locator::css(SearchPage::RESULTS_TOTAL), "div");
                with_last(&mut out, |e| e.with_text(format!("{total} results for \"{term}\"")));
                add(&mut out, Locator::name(SearchPage::DATE_FILTER), "select");
                with_last(&mut out, |e| e.with_attribute("name", SearchPage::DATE_FILTER));
                add(&mut out, Locator::name(SearchPage::SORT_FILTER), "select");
                with_last(&mut out, |e| e.with_attribute("name", SearchPage::SORT_FILTER));
                if total == 0 {
                    add(&mut out, Locator::css(SearchPage::NO_RESULTS), "p");
                    with_last(&mut out, |e| e.with_text(format!("No results found for \"{term}\"")));
                }
                for i in 0..total {
                    let id = SEARCH_ARTICLE_BASE + i as u32;
                    let href = self.article_url(id);
                    add(&mut out, Locator::css(SearchPage::ITEMS), "section");
                    with_last(&mut out, |e| e.with_attribute("href", href.clone()));
                    add(&mut out, Locator::css(SearchPage::HEADLINES), "a");
                    with_last(&mut out, |e| {
                        e.with_text(Self::article_title(id))
                            .with_attribute("href", href.clone())
                    });
                    add(&mut out, Locator::css(SearchPage::ITEM_TIMESTAMP), "span");
                    with_last(&mut out, |e| e.with_text(format!("{} days ago", i + 1)));
                }
            }
            Page::Missing => {
                add(&mut out, Locator::css(ArticlePage::ERROR_BANNER), "div");
                with_last(&mut out, |e| e.with_text("Page not found"));
            }
        }
        out
    }
}

fn with_last(out: &mut [(Locator, Element)], f: impl FnOnce(Element) -> Element) {
    if let Some((_, element)) = out.last_mut() {
        *element = f(std::mem::replace(element, Element::new("", "")));
    }
}

impl PageDriver for SimulatedSite {
    fn navigate(&mut self, url: &str) -> DriverResult<()> {
        self.ensure_open()?;
        let (url, page) = self.route(url)?;
        self.url = url;
        self.page = page;
        Ok(())
    }

    fn find_all(&self, locator: &Locator) -> DriverResult<Vec<Element>> {
        self.ensure_open()?;
        Ok(self
            .render()
            .into_iter()
            .filter(|(l, _)| l == locator)
            .map(|(_, e)| e)
            .collect())
    }

    fn current_url(&self) -> DriverResult<String> {
        self.ensure_open()?;
        Ok(self.url.clone())
    }

    fn click(&mut self, element: &Element) -> DriverResult<()> {
        self.ensure_open()?;
        if element.tag_name == "select" {
            return Ok(());
        }
        let href = element
            .attribute("href")
            .ok_or_else(|| DriverError::interaction(format!("{} is not clickable", element.id)))?
            .to_string();
        self.navigate(&href)
    }

    fn type_text(&mut self, element: &Element, text: &str) -> DriverResult<()> {
        self.ensure_open()?;
        if element.tag_name != "input" {
            return Err(DriverError::interaction(format!(
                "cannot type into <{}>",
                element.tag_name
            )));
        }
        self.typed = text.to_string();
        Ok(())
    }

    fn submit(&mut self, element: &Element) -> DriverResult<()> {
        self.ensure_open()?;
        if element.attribute("name") != Some(HomePage::SEARCH_INPUT) {
            return Err(DriverError::interaction(format!("{} is not in a form", element.id)));
        }
        let url = self.search_url(&self.typed, None)?;
        self.typed.clear();
        self.navigate(&url)
    }

    fn select_option(&mut self, element: &Element, visible_text: &str) -> DriverResult<()> {
        self.ensure_open()?;
        let Page::Search { term, .. } = &self.page else {
            return Err(DriverError::interaction("no select on this page"));
        };
        match element.attribute("name") {
            Some(SearchPage::DATE_FILTER) if DATE_FILTERS.contains(&visible_text) => {
                let url = self.search_url(term, Some(visible_text))?;
                self.navigate(&url)
            }
            Some(SearchPage::SORT_FILTER) if SORT_OPTIONS.contains(&visible_text) => {
                self.sort = visible_text.to_string();
                Ok(())
            }
            _ => Err(DriverError::interaction(format!(
                "cannot select '{visible_text}' in {}",
                element.id
            ))),
        }
    }

    fn quit(&mut self) -> DriverResult<()> {
        self.ensure_open()?;
        self.closed = true;
        self.events.borrow_mut().push(SessionEvent::Quit(self.session));
        if self.behavior.fail_quit {
            return Err(DriverError::interaction("browser did not exit cleanly"));
        }
        Ok(())
    }

    fn wait_until(&mut self, condition: &WaitCondition, options: &WaitOptions) -> DriverResult<()> {
        if self.is_satisfied(condition)? {
            Ok(())
        } else {
            Err(DriverError::Timeout {
                condition: condition.to_string(),
                ms: options.timeout_ms,
            })
        }
    }
}

/// Launches [`SimulatedSite`] sessions and records their lifecycle
#[derive(Debug, Clone)]
pub struct SimulatedLauncher {
    base_url: String,
    behavior: SiteBehavior,
    sessions: usize,
    events: EventLog,
}

impl SimulatedLauncher {
    /// Launcher for a site hosted at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            behavior: SiteBehavior::default(),
            sessions: 0,
            events: Rc::default(),
        }
    }

    /// Set the behaviour of sessions launched from now on
    #[must_use]
    pub fn with_behavior(mut self, behavior: SiteBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Change behaviour for later launches
    pub fn set_behavior(&mut self, behavior: SiteBehavior) {
        self.behavior = behavior;
    }

    /// Sessions launched so far
    #[must_use]
    pub const fn launched(&self) -> usize {
        self.sessions
    }

    /// Lifecycle events so far
    #[must_use]
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.borrow().clone()
    }
}

impl DriverLauncher for SimulatedLauncher {
    type Driver = SimulatedSite;

    fn launch(&mut self, config: &DriverConfig) -> DriverResult<SimulatedSite> {
        if self.behavior.fail_launch {
            return Err(DriverError::launch("simulated browser refused to start"));
        }
        self.sessions += 1;
        self.events
            .borrow_mut()
            .push(SessionEvent::Launched(self.sessions));
        tracing::debug!(
            session = self.sessions,
            headless = config.headless,
            "launched simulated browser"
        );
        Ok(SimulatedSite::with_log(
            self.base_url.clone(),
            self.behavior.clone(),
            self.sessions,
            Rc::clone(&self.events),
        ))
    }
}
