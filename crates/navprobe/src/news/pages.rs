//! Page objects for the news site.
//!
//! Locators are the site's generated class names; they change whenever the
//! site is rebuilt, so they live here and nowhere else.

use crate::driver::{Element, PageDriver};
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::{DriverError, DriverResult};
use crate::wait::WaitCondition;

/// Element `index` of `elements`, or [`DriverError::IndexOutOfBounds`]
fn nth(elements: Vec<Element>, index: usize, what: &str) -> DriverResult<Element> {
    let len = elements.len();
    elements
        .into_iter()
        .nth(index)
        .ok_or_else(|| DriverError::IndexOutOfBounds {
            what: what.to_string(),
            index,
            len,
        })
}

/// Whether the first element matching `locator` is displayed; absent means no
fn displayed<D: PageDriver + ?Sized>(driver: &D, locator: &Locator) -> DriverResult<bool> {
    match driver.find(locator) {
        Ok(element) => Ok(element.is_displayed()),
        Err(DriverError::NotFound { .. }) => Ok(false),
        Err(err) => Err(err),
    }
}

/// The homepage, plus the site header shared by every page
#[derive(Debug, Clone)]
pub struct HomePage {
    marker: Locator,
    headlines: Locator,
    home_link: Locator,
    search_input: Locator,
}

impl HomePage {
    /// Container only rendered on the homepage
    pub const MARKER: &'static str = "div.liAe.uMOq.zYIfP";
    /// Article heading links
    pub const HEADLINES: &'static str = "h2 a.AnchorLink";
    /// Header logo linking back home
    pub const HOME_LINK: &'static str = "prism-logo";
    /// Header search box
    pub const SEARCH_INPUT: &'static str = "searchtext";

    /// Create the page object
    #[must_use]
    pub fn new() -> Self {
        Self {
            marker: Locator::css(Self::MARKER),
            headlines: Locator::css(Self::HEADLINES),
            home_link: Locator::test_id(Self::HOME_LINK),
            search_input: Locator::name(Self::SEARCH_INPUT),
        }
    }

    /// Texts of all article headings
    pub fn article_headings<D: PageDriver + ?Sized>(&self, driver: &D) -> DriverResult<Vec<String>> {
        Ok(driver
            .find_all(&self.headlines)?
            .into_iter()
            .map(|e| e.text)
            .collect())
    }

    /// Text of heading `index`
    pub fn article_heading<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        index: usize,
    ) -> DriverResult<String> {
        Ok(nth(driver.find_all(&self.headlines)?, index, "article headings")?.text)
    }

    /// Open article `index`
    pub fn click_article<D: PageDriver + ?Sized>(&self, driver: &mut D, index: usize) -> DriverResult<()> {
        let heading = nth(driver.find_all(&self.headlines)?, index, "article headings")?;
        driver.click(&heading)
    }

    /// Click the header logo
    pub fn click_home_link<D: PageDriver + ?Sized>(&self, driver: &mut D) -> DriverResult<()> {
        let link = driver.find(&self.home_link)?;
        driver.click(&link)
    }

    /// Search from the header box
    pub fn search_for<D: PageDriver + ?Sized>(&self, driver: &mut D, term: &str) -> DriverResult<()> {
        let input = driver.find(&self.search_input)?;
        driver.type_text(&input, term)?;
        driver.submit(&input)
    }
}

impl Default for HomePage {
    fn default() -> Self {
        Self::new()
    }
}

impl PageObject for HomePage {
    fn page_name(&self) -> &str {
        "homepage"
    }

    fn url_pattern(&self) -> &str {
        "/"
    }

    fn ready_condition(&self) -> WaitCondition {
        WaitCondition::present(&self.marker)
    }
}

/// An article page
#[derive(Debug, Clone)]
pub struct ArticlePage {
    title: Locator,
    author: Locator,
    timestamp: Locator,
    body: Locator,
    share_buttons: Locator,
    popular_articles: Locator,
    error_banner: Locator,
}

impl ArticlePage {
    /// Headline
    pub const TITLE: &'static str = ".vMjAx.gjbzK.tntuS.eHrJ.mTgUP";
    /// Byline
    pub const AUTHOR: &'static str =
        ".TQPvQ.fVlAg.HUcap.kxY.REjk.UamUc.WxHIR.HhZOB.yaUf.VOJBn.KMpjV.XSbaH.Umfib.ukdDD";
    /// Publication time
    pub const TIMESTAMP: &'static str = ".xAPpq.JQYD.ZdbeE.jTKbV.zIIsP.xpuOU.pCRh";
    /// Story body
    pub const BODY: &'static str = ".xvlfx.ZRifP.TKoO.eaKKC.EcdEg.bOdfO";
    /// Share buttons
    pub const SHARE_BUTTONS: &'static str = ".WEJto";
    /// Popular-articles rail entries
    pub const POPULAR_ARTICLES: &'static str = ".QGHKv.iVcn.avodi.rEPuv.ICwhc.ibBnq.Bkgbl.ZLXw.kSqqG.rEBmF";
    /// Error banner
    pub const ERROR_BANNER: &'static str = ".error-message";

    /// Create the page object
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: Locator::css(Self::TITLE),
            author: Locator::css(Self::AUTHOR),
            timestamp: Locator::css(Self::TIMESTAMP),
            body: Locator::css(Self::BODY),
            share_buttons: Locator::css(Self::SHARE_BUTTONS),
            popular_articles: Locator::css(Self::POPULAR_ARTICLES),
            error_banner: Locator::css(Self::ERROR_BANNER),
        }
    }

    /// Headline text
    pub fn title<D: PageDriver + ?Sized>(&self, driver: &D) -> DriverResult<String> {
        Ok(driver.find(&self.title)?.text)
    }

    /// Byline text
    pub fn author<D: PageDriver + ?Sized>(&self, driver: &D) -> DriverResult<String> {
        Ok(driver.find(&self.author)?.text)
    }

    /// Publication time text
    pub fn timestamp<D: PageDriver + ?Sized>(&self, driver: &D) -> DriverResult<String> {
        Ok(driver.find(&self.timestamp)?.text)
    }

    /// Number of share buttons
    pub fn share_buttons_count<D: PageDriver + ?Sized>(&self, driver: &D) -> DriverResult<usize> {
        Ok(driver.find_all(&self.share_buttons)?.len())
    }

    /// Number of popular-article entries
    pub fn popular_articles_count<D: PageDriver + ?Sized>(&self, driver: &D) -> DriverResult<usize> {
        Ok(driver.find_all(&self.popular_articles)?.len())
    }

    /// Whether the body is displayed
    pub fn body_displayed<D: PageDriver + ?Sized>(&self, driver: &D) -> DriverResult<bool> {
        Ok(driver.find(&self.body)?.is_displayed())
    }

    /// Headline and body both displayed
    pub fn is_content_visible<D: PageDriver + ?Sized>(&self, driver: &D) -> DriverResult<bool> {
        Ok(displayed(driver, &self.title)? && displayed(driver, &self.body)?)
    }

    /// Whether an error banner is shown
    pub fn has_error<D: PageDriver + ?Sized>(&self, driver: &D) -> DriverResult<bool> {
        Ok(!driver.find_all(&self.error_banner)?.is_empty())
    }
}

impl Default for ArticlePage {
    fn default() -> Self {
        Self::new()
    }
}

impl PageObject for ArticlePage {
    fn page_name(&self) -> &str {
        "article"
    }

    fn url_pattern(&self) -> &str {
        "/:section/story"
    }

    fn ready_condition(&self) -> WaitCondition {
        WaitCondition::present(&self.title)
    }
}

/// Search results, filtered or not
#[derive(Debug, Clone)]
pub struct SearchPage {
    results_total: Locator,
    date_filter: Locator,
    sort_filter: Locator,
    items: Locator,
    item_timestamp: Locator,
    no_results: Locator,
    headlines: Locator,
    current_filter: Option<String>,
}

impl SearchPage {
    /// Results container, rendered with or without results
    pub const RESULTS_TOTAL: &'static str = ".Search__results";
    /// Date filter `<select>` name
    pub const DATE_FILTER: &'static str = "after";
    /// Sort `<select>` name
    pub const SORT_FILTER: &'static str = "sort";
    /// One result
    pub const ITEMS: &'static str = ".ContentRoll__Item";
    /// Result timestamp
    pub const ITEM_TIMESTAMP: &'static str = ".TimeStamp__Date";
    /// Empty-result notice
    pub const NO_RESULTS: &'static str = ".Search__No__Results";
    /// Result headline links
    pub const HEADLINES: &'static str = ".ContentRoll__Headline h2 a";

    /// Create the page object
    #[must_use]
    pub fn new() -> Self {
        Self {
            results_total: Locator::css(Self::RESULTS_TOTAL),
            date_filter: Locator::name(Self::DATE_FILTER),
            sort_filter: Locator::name(Self::SORT_FILTER),
            items: Locator::css(Self::ITEMS),
            item_timestamp: Locator::css(Self::ITEM_TIMESTAMP),
            no_results: Locator::css(Self::NO_RESULTS),
            headlines: Locator::css(Self::HEADLINES),
            current_filter: None,
        }
    }

    /// Text of the results summary
    pub fn results_total<D: PageDriver + ?Sized>(&self, driver: &D) -> DriverResult<String> {
        Ok(driver.find(&self.results_total)?.text)
    }

    /// Number of results on the page
    pub fn result_count<D: PageDriver + ?Sized>(&self, driver: &D) -> DriverResult<usize> {
        Ok(driver.find_all(&self.items)?.len())
    }

    /// Whether the page holds no results
    pub fn no_results_found<D: PageDriver + ?Sized>(&self, driver: &D) -> DriverResult<bool> {
        Ok(self.result_count(driver)? == 0)
    }

    /// Text of the empty-result notice
    pub fn no_results_text<D: PageDriver + ?Sized>(&self, driver: &D) -> DriverResult<String> {
        Ok(driver.find(&self.no_results)?.text)
    }

    /// Timestamp of the first result
    pub fn first_timestamp<D: PageDriver + ?Sized>(&self, driver: &D) -> DriverResult<String> {
        Ok(driver.find(&self.item_timestamp)?.text)
    }

    /// Headline of result `index`
    pub fn headline<D: PageDriver + ?Sized>(&self, driver: &D, index: usize) -> DriverResult<String> {
        Ok(nth(driver.find_all(&self.headlines)?, index, "search headlines")?.text)
    }

    /// Link target of result `index`
    pub fn article_url<D: PageDriver + ?Sized>(&self, driver: &D, index: usize) -> DriverResult<String> {
        let link = nth(driver.find_all(&self.headlines)?, index, "search headlines")?;
        link.attribute("href")
            .map(str::to_string)
            .ok_or_else(|| DriverError::interaction(format!("result {index} has no href")))
    }

    /// Open result `index` by clicking its container
    pub fn click_result<D: PageDriver + ?Sized>(&self, driver: &mut D, index: usize) -> DriverResult<()> {
        let item = nth(driver.find_all(&self.items)?, index, "search results")?;
        driver.click(&item)
    }

    /// Choose a date range by its visible text
    pub fn filter_by_date<D: PageDriver + ?Sized>(&mut self, driver: &mut D, option: &str) -> DriverResult<()> {
        let select = driver.find(&self.date_filter)?;
        driver.select_option(&select, option)?;
        self.current_filter = Some(option.to_string());
        Ok(())
    }

    /// Choose a sort order by its visible text
    pub fn sort_by<D: PageDriver + ?Sized>(&self, driver: &mut D, option: &str) -> DriverResult<()> {
        let select = driver.find(&self.sort_filter)?;
        driver.click(&select)?;
        driver.select_option(&select, option)
    }

    /// Date filter applied through this page object, if any
    #[must_use]
    pub fn current_filter(&self) -> Option<&str> {
        self.current_filter.as_deref()
    }

    /// Whether a date filter is applied
    #[must_use]
    pub const fn has_active_filter(&self) -> bool {
        self.current_filter.is_some()
    }

    /// Forget the applied filter
    pub fn clear_filter(&mut self) {
        self.current_filter = None;
    }
}

impl Default for SearchPage {
    fn default() -> Self {
        Self::new()
    }
}

impl PageObject for SearchPage {
    fn page_name(&self) -> &str {
        "search"
    }

    fn url_pattern(&self) -> &str {
        "/search"
    }

    fn ready_condition(&self) -> WaitCondition {
        WaitCondition::present(&self.results_total)
    }
}
