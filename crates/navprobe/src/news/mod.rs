//! FSM model of the news site.
//!
//! Four pages, nine actions. Each action re-checks its guard, drives the site
//! through the page objects, waits for the destination to be ready, records
//! the new state and then checks the destination's post-conditions.

pub mod config;
pub mod pages;

pub use config::{ConfigError, SiteConfig};
pub use pages::{ArticlePage, HomePage, SearchPage};

use crate::driver::{DriverLauncher, PageDriver};
use crate::model::{ActionDef, DriverResultExt, FsmModel, Guard, StepContext};
use crate::page_object::{query_param, PageObject};
use crate::result::{ModelError, ModelResult};
use crate::wait::WaitCondition;
use serde::Serialize;
use std::fmt;

/// Pages of the news site
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NewsPage {
    /// Starting page
    Homepage,
    /// A story, opened from the homepage or a result list
    ArticlePage,
    /// Unfiltered search results
    SearchPage,
    /// Search results narrowed by date
    FilteredSearchPage,
}

impl NewsPage {
    /// Stable name used in reports
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Homepage => "HOMEPAGE",
            Self::ArticlePage => "ARTICLE_PAGE",
            Self::SearchPage => "SEARCH_PAGE",
            Self::FilteredSearchPage => "FILTERED_SEARCH_PAGE",
        }
    }
}

impl fmt::Display for NewsPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn on_homepage(s: NewsPage) -> bool {
    s == NewsPage::Homepage
}

fn on_article(s: NewsPage) -> bool {
    s == NewsPage::ArticlePage
}

fn on_search(s: NewsPage) -> bool {
    s == NewsPage::SearchPage
}

fn on_filtered_search(s: NewsPage) -> bool {
    s == NewsPage::FilteredSearchPage
}

/// The live session, or a resource error when the model was reset offline
fn session<D>(driver: &mut Option<D>) -> ModelResult<&mut D> {
    driver
        .as_mut()
        .ok_or_else(|| ModelError::resource_init("no browser session; reset with live = true"))
}

/// The news site as a test model
#[derive(Debug)]
pub struct NewsSiteModel<L: DriverLauncher> {
    state: Option<NewsPage>,
    launcher: L,
    driver: Option<L::Driver>,
    config: SiteConfig,
    home: HomePage,
    article: ArticlePage,
    search: SearchPage,
}

impl<L: DriverLauncher> NewsSiteModel<L> {
    /// Create a model; no browser is started until `reset(true)`
    #[must_use]
    pub fn new(launcher: L, config: SiteConfig) -> Self {
        Self {
            state: None,
            launcher,
            driver: None,
            config,
            home: HomePage::new(),
            article: ArticlePage::new(),
            search: SearchPage::new(),
        }
    }

    /// Site configuration
    #[must_use]
    pub const fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Launcher
    #[must_use]
    pub const fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Mutable launcher, e.g. to change what the next session looks like
    pub fn launcher_mut(&mut self) -> &mut L {
        &mut self.launcher
    }

    /// Current browser session, if any
    #[must_use]
    pub const fn driver(&self) -> Option<&L::Driver> {
        self.driver.as_ref()
    }

    /// Search page object
    #[must_use]
    pub const fn search_page(&self) -> &SearchPage {
        &self.search
    }

    /// Close the browser session, if any
    pub fn close(&mut self) -> ModelResult<()> {
        match self.driver.take() {
            Some(mut driver) => driver
                .quit()
                .map_err(|e| ModelError::resource_init(format!("Failed to close browser: {e}"))),
            None => Ok(()),
        }
    }

    fn begin(&self, action: &'static str, guard: Guard<NewsPage>) -> ModelResult<StepContext> {
        let state = self.state();
        let ctx = StepContext::new(state, action);
        if guard(state) {
            Ok(ctx)
        } else {
            Err(ctx.illegal())
        }
    }

    fn open_homepage(&mut self) -> Result<L::Driver, String> {
        let mut driver = self
            .launcher
            .launch(&self.config.driver)
            .map_err(|e| e.to_string())?;

        let landed = driver
            .navigate(&self.config.base_url)
            .and_then(|()| driver.wait_until(&self.home.ready_condition(), &self.config.wait))
            .map_err(|e| e.to_string())
            .and_then(|()| driver.current_url().map_err(|e| e.to_string()))
            .and_then(|url| {
                if url == self.config.base_url {
                    Ok(())
                } else {
                    Err(format!(
                        "Should start on homepage: expected {}, got {url}",
                        self.config.base_url
                    ))
                }
            });

        match landed {
            Ok(()) => Ok(driver),
            Err(message) => {
                if let Err(err) = driver.quit() {
                    tracing::warn!(error = %err, "failed to close partially started browser");
                }
                Err(message)
            }
        }
    }

    fn click_article(&mut self) -> ModelResult<()> {
        let ctx = self.begin("clickArticle", on_homepage)?;
        let index = self.config.article_index;
        let wait = self.config.wait;
        let Self {
            state,
            driver,
            home,
            article,
            ..
        } = self;
        let driver = session(driver)?;

        let expected = home.article_heading(driver, index).in_step(&ctx)?;
        home.click_article(driver, index).in_step(&ctx)?;
        article.wait_loaded(driver, &wait).in_step(&ctx)?;
        *state = Some(NewsPage::ArticlePage);

        ctx.ensure(
            article.is_content_visible(driver).in_step(&ctx)?,
            "Article page should be fully loaded",
        )?;
        let title = article.title(driver).in_step(&ctx)?;
        ctx.ensure_eq(expected.as_str(), title.as_str(), "Article title should match")
    }

    fn search_from(&mut self, action: &'static str, guard: Guard<NewsPage>) -> ModelResult<()> {
        let ctx = self.begin(action, guard)?;
        let wait = self.config.wait;
        let Self {
            state,
            driver,
            config,
            home,
            search,
            ..
        } = self;
        let driver = session(driver)?;

        home.search_for(driver, &config.search_term).in_step(&ctx)?;
        search.wait_loaded(driver, &wait).in_step(&ctx)?;
        search.clear_filter();
        *state = Some(NewsPage::SearchPage);

        let url = driver.current_url().in_step(&ctx)?;
        ctx.ensure_eq(
            &Some(config.search_term.as_str()),
            &query_param(&url, "searchtext").as_deref(),
            "Search term should be in URL",
        )?;
        let count = search.result_count(driver).in_step(&ctx)?;
        ctx.ensure(count > 0, "Search should return at least one result")
    }

    fn search_from_article(&mut self) -> ModelResult<()> {
        self.search_from("searchFromArticle", on_article)
    }

    fn search_from_home(&mut self) -> ModelResult<()> {
        self.search_from("search", on_homepage)
    }

    fn return_home(&mut self, action: &'static str, guard: Guard<NewsPage>) -> ModelResult<()> {
        let ctx = self.begin(action, guard)?;
        let wait = self.config.wait;
        let Self {
            state,
            driver,
            config,
            home,
            ..
        } = self;
        let driver = session(driver)?;

        home.click_home_link(driver).in_step(&ctx)?;
        home.wait_loaded(driver, &wait).in_step(&ctx)?;
        driver
            .wait_until(&WaitCondition::url_is(config.base_url.as_str()), &wait)
            .in_step(&ctx)?;
        *state = Some(NewsPage::Homepage);

        let url = driver.current_url().in_step(&ctx)?;
        ctx.ensure_eq(config.base_url.as_str(), url.as_str(), "Should be on homepage")
    }

    fn return_from_article_to_home(&mut self) -> ModelResult<()> {
        self.return_home("returnFromArticleToHome", on_article)
    }

    fn return_from_search_to_home(&mut self) -> ModelResult<()> {
        self.return_home("returnFromSearchToHome", on_search)
    }

    fn return_from_filtered_search_to_home(&mut self) -> ModelResult<()> {
        self.return_home("returnFromFilteredSearchToHome", on_filtered_search)
    }

    fn open_result(&mut self, action: &'static str, guard: Guard<NewsPage>) -> ModelResult<()> {
        let ctx = self.begin(action, guard)?;
        let index = self.config.search_result_index;
        let wait = self.config.wait;
        let Self {
            state,
            driver,
            article,
            search,
            ..
        } = self;
        let driver = session(driver)?;

        let expected = search.headline(driver, index).in_step(&ctx)?;
        let url = search.article_url(driver, index).in_step(&ctx)?;
        driver.navigate(&url).in_step(&ctx)?;
        article.wait_loaded(driver, &wait).in_step(&ctx)?;
        *state = Some(NewsPage::ArticlePage);

        ctx.ensure(
            article.is_content_visible(driver).in_step(&ctx)?,
            "Article page should be fully loaded",
        )?;
        let title = article.title(driver).in_step(&ctx)?;
        ctx.ensure_eq(expected.as_str(), title.as_str(), "Article title should match")
    }

    fn click_article_from_search(&mut self) -> ModelResult<()> {
        self.open_result("clickArticleFromSearch", on_search)
    }

    fn click_article_from_filtered_search(&mut self) -> ModelResult<()> {
        self.open_result("clickArticleFromFilteredSearch", on_filtered_search)
    }

    fn filter_results(&mut self) -> ModelResult<()> {
        let ctx = self.begin("filterResults", on_search)?;
        let wait = self.config.wait;
        let Self {
            state,
            driver,
            config,
            search,
            ..
        } = self;
        let driver = session(driver)?;

        let before = search.result_count(driver).in_step(&ctx)?;
        search
            .filter_by_date(driver, &config.date_filter)
            .in_step(&ctx)?;
        search.wait_loaded(driver, &wait).in_step(&ctx)?;
        *state = Some(NewsPage::FilteredSearchPage);

        let after = search.result_count(driver).in_step(&ctx)?;
        ctx.ensure(
            after <= before,
            &format!("Filter should not add results ({before} before, {after} after)"),
        )
    }
}

impl<L: DriverLauncher> FsmModel for NewsSiteModel<L> {
    type State = NewsPage;

    const STATES: &'static [NewsPage] = &[
        NewsPage::Homepage,
        NewsPage::ArticlePage,
        NewsPage::SearchPage,
        NewsPage::FilteredSearchPage,
    ];

    const INITIAL: NewsPage = NewsPage::Homepage;

    // Order is the tie-break order: the first-choice walk from HOMEPAGE
    // depends on searchFromArticle preceding returnFromArticleToHome.
    fn actions() -> Vec<ActionDef<Self>> {
        vec![
            ActionDef::new(
                "clickArticle",
                on_homepage,
                NewsPage::ArticlePage,
                Self::click_article,
            ),
            ActionDef::new(
                "searchFromArticle",
                on_article,
                NewsPage::SearchPage,
                Self::search_from_article,
            ),
            ActionDef::new(
                "returnFromArticleToHome",
                on_article,
                NewsPage::Homepage,
                Self::return_from_article_to_home,
            ),
            ActionDef::new(
                "search",
                on_homepage,
                NewsPage::SearchPage,
                Self::search_from_home,
            ),
            ActionDef::new(
                "returnFromSearchToHome",
                on_search,
                NewsPage::Homepage,
                Self::return_from_search_to_home,
            ),
            ActionDef::new(
                "clickArticleFromSearch",
                on_search,
                NewsPage::ArticlePage,
                Self::click_article_from_search,
            ),
            ActionDef::new(
                "filterResults",
                on_search,
                NewsPage::FilteredSearchPage,
                Self::filter_results,
            ),
            ActionDef::new(
                "returnFromFilteredSearchToHome",
                on_filtered_search,
                NewsPage::Homepage,
                Self::return_from_filtered_search_to_home,
            ),
            ActionDef::new(
                "clickArticleFromFilteredSearch",
                on_filtered_search,
                NewsPage::ArticlePage,
                Self::click_article_from_filtered_search,
            ),
        ]
    }

    fn state(&self) -> NewsPage {
        self.state.unwrap_or(Self::INITIAL)
    }

    fn reset(&mut self, live: bool) -> ModelResult<()> {
        self.state = Some(Self::INITIAL);
        self.search.clear_filter();
        if !live {
            return Ok(());
        }

        if let Some(mut previous) = self.driver.take() {
            if let Err(err) = previous.quit() {
                tracing::warn!(error = %err, "failed to close previous browser");
            }
        }

        let driver = self.open_homepage().map_err(|message| {
            ModelError::resource_init(format!(
                "Failed to open {}: {message}",
                self.config.base_url
            ))
        })?;
        self.driver = Some(driver);
        tracing::info!(base_url = %self.config.base_url, "browser ready on homepage");
        Ok(())
    }
}

impl<L: DriverLauncher> Drop for NewsSiteModel<L> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!(error = %err, "failed to close browser on drop");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::graph::TransitionGraph;
    use crate::mock::{SimulatedLauncher, SiteBehavior};
    use crate::result::FailureKind;

    fn model() -> NewsSiteModel<SimulatedLauncher> {
        let config = SiteConfig::new().with_base_url("https://news.test/");
        NewsSiteModel::new(SimulatedLauncher::new("https://news.test/"), config)
    }

    #[test]
    fn test_page_names() {
        assert_eq!(NewsPage::Homepage.to_string(), "HOMEPAGE");
        assert_eq!(
            serde_json::to_string(&NewsPage::FilteredSearchPage).unwrap(),
            "\"FILTERED_SEARCH_PAGE\""
        );
    }

    #[test]
    fn test_action_table_order() {
        let names: Vec<_> = NewsSiteModel::<SimulatedLauncher>::actions()
            .iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "clickArticle",
                "searchFromArticle",
                "returnFromArticleToHome",
                "search",
                "returnFromSearchToHome",
                "clickArticleFromSearch",
                "filterResults",
                "returnFromFilteredSearchToHome",
                "clickArticleFromFilteredSearch",
            ]
        );
    }

    #[test]
    fn test_graph_is_valid() {
        let graph = TransitionGraph::build::<NewsSiteModel<SimulatedLauncher>>();
        assert_eq!(graph.edge_count(), 9);
        assert!(graph.validate().is_valid);
        assert_eq!(graph.edges_from(NewsPage::SearchPage).len(), 3);
    }

    #[test]
    fn test_offline_reset_has_no_session() {
        let mut m = model();
        m.reset(false).unwrap();
        assert!(m.driver().is_none());
        let err = m.fire_named("clickArticle").unwrap_err();
        assert_eq!(err.kind(), FailureKind::ResourceInit);
        assert_eq!(m.state(), NewsPage::Homepage);
    }

    #[test]
    fn test_live_walk() {
        let mut m = model();
        m.reset(true).unwrap();
        assert_eq!(m.fire_named("search").unwrap(), NewsPage::SearchPage);
        assert_eq!(m.fire_named("filterResults").unwrap(), NewsPage::FilteredSearchPage);
        assert_eq!(m.search_page().current_filter(), Some("Last Week"));
        assert_eq!(
            m.fire_named("clickArticleFromFilteredSearch").unwrap(),
            NewsPage::ArticlePage
        );
        assert_eq!(m.fire_named("returnFromArticleToHome").unwrap(), NewsPage::Homepage);
    }

    #[test]
    fn test_filter_cleared_on_reset() {
        let mut m = model();
        m.reset(true).unwrap();
        m.fire_named("search").unwrap();
        m.fire_named("filterResults").unwrap();
        m.reset(true).unwrap();
        assert!(!m.search_page().has_active_filter());
    }

    #[test]
    fn test_search_term_needing_encoding() {
        for term in ["R&D tax", "café crème"] {
            let config = SiteConfig::new()
                .with_base_url("https://news.test/")
                .with_search_term(term);
            let mut m = NewsSiteModel::new(SimulatedLauncher::new("https://news.test/"), config);
            m.reset(true).unwrap();
            assert_eq!(m.fire_named("search").unwrap(), NewsPage::SearchPage);
            let url = m.driver().unwrap().current_url().unwrap();
            assert_eq!(query_param(&url, "searchtext").as_deref(), Some(term));
            assert!(!url.contains(term));
        }
    }

    #[test]
    fn test_close_quits_session() {
        let mut m = model();
        m.reset(true).unwrap();
        m.close().unwrap();
        assert!(m.driver().is_none());
        assert!(m.close().is_ok());
    }

    #[test]
    fn test_landing_redirect_is_resource_init() {
        let mut m = model();
        m.launcher_mut().set_behavior(
            SiteBehavior::new().with_landing_redirect("https://news.test/?edition=intl"),
        );
        let err = m.reset(true).unwrap_err();
        assert_eq!(err.kind(), FailureKind::ResourceInit);
        assert!(m.driver().is_none());
    }
}
