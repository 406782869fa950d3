//! Drives the portal's advanced search form.
//!
//! Steps run in a fixed order and each one either satisfies its wait
//! condition within its bound or aborts the whole navigation with the
//! failing step attached. Nothing is retried.

use anyhow::{anyhow, Result};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::PortalConfig;
use crate::scrapers::error::{NavigationError, NavigationStep};
use crate::scrapers::extract::CARD_SELECTOR;
use crate::scrapers::session::{ElementState, Locator, PageDriver};
use crate::scrapers::types::SearchQuery;

pub const ADVANCED_SEARCH_XPATH: &str = "//button[contains(., 'Busca avançada')]";
pub const TERM_INPUT_SELECTOR: &str = "#termo";
pub const REGION_SELECTOR: &str = "#uf";
pub const SUBMIT_XPATH: &str = "//button[contains(., 'Buscar')]";

/// Dropdown option whose visible label is exactly `code`.
pub fn region_option(code: &str) -> Locator {
    Locator::xpath(format!(
        "//div[contains(@class, 'q-item__label') and text()={}]",
        xpath_literal(code)
    ))
}

/// Quote an arbitrary string as an XPath 1.0 literal.
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }
    let parts: Vec<String> = value.split('\'').map(|p| format!("'{}'", p)).collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[derive(Clone)]
pub struct NavigationController {
    config: PortalConfig,
}

impl NavigationController {
    pub fn new(config: PortalConfig) -> Self {
        Self { config }
    }

    /// Run the search and return the rendered results page.
    pub fn run<D: PageDriver>(
        &self,
        driver: &D,
        query: &SearchQuery,
    ) -> Result<String, NavigationError> {
        use NavigationStep::*;

        info!("Opening portal at {}", self.config.root_url);
        step(LoadPortal, driver.goto(&self.config.root_url))?;

        let advanced = Locator::xpath(ADVANCED_SEARCH_XPATH);
        step(OpenAdvancedSearch, self.wait_and_click(driver, &advanced))?;
        info!("Opened advanced search");

        let term_input = Locator::css(TERM_INPUT_SELECTOR);
        let settled = self.settle(self.config.panel_settle(), || {
            probed(driver, &term_input, ElementState::Visible)
        });
        if !settled {
            debug!(
                step = %PanelSettle,
                "Search panel still animating after {:?}",
                self.config.panel_settle()
            );
        }

        info!("Filling search term: '{}'", query.term_text);
        step(
            FillSearchTerm,
            self.wait_for(driver, &term_input, ElementState::Visible, self.config.element_timeout())
                .and_then(|_| driver.type_text(&term_input, &query.term_text)),
        )?;

        if let Some(code) = &query.region_code {
            info!("Selecting region: {}", code);
            step(
                OpenRegionSelector,
                driver.click(&Locator::css(REGION_SELECTOR)),
            )?;
            step(SelectRegion, self.wait_and_click(driver, &region_option(code)))?;
        }

        // The portal may already list announcements before the search runs;
        // results count as rendered only once the first card differs from
        // this one.
        let card = Locator::css(CARD_SELECTOR);
        let stale_card = driver.outer_html(&card).ok().flatten();

        info!("Submitting search");
        step(Submit, driver.click(&Locator::xpath(SUBMIT_XPATH)))?;

        let no_results = Locator::xpath(self.config.no_results_xpath.clone());
        let rendered = self.settle(self.config.results_settle(), || {
            probed(driver, &no_results, ElementState::Present)
                || matches!(
                    driver.outer_html(&card),
                    Ok(Some(html)) if Some(&html) != stale_card.as_ref()
                )
        });
        if !rendered {
            warn!(
                step = %ResultsSettle,
                "Results not rendered after {:?}, capturing page as is",
                self.config.results_settle()
            );
        }

        step(CaptureMarkup, driver.content())
    }

    fn wait_and_click<D: PageDriver>(&self, driver: &D, locator: &Locator) -> Result<()> {
        self.wait_for(driver, locator, ElementState::Clickable, self.config.element_timeout())?;
        driver.click(locator)
    }

    /// Poll until `locator` reaches `state`, failing once `timeout` elapses.
    fn wait_for<D: PageDriver>(
        &self,
        driver: &D,
        locator: &Locator,
        state: ElementState,
        timeout: Duration,
    ) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let mut last_error = None;

        loop {
            match driver.probe(locator, state) {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) => last_error = Some(e),
            }

            if Instant::now() >= deadline {
                let message = format!(
                    "timed out after {:?} waiting for {:?} to be {:?}",
                    timeout, locator, state
                );
                return Err(match last_error {
                    Some(e) => e.context(message),
                    None => anyhow!(message),
                });
            }
            thread::sleep(self.config.poll_interval());
        }
    }

    /// Poll until `ready` holds. Returns false when `bound` expired first;
    /// expiry is not an error.
    fn settle(&self, bound: Duration, mut ready: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + bound;

        loop {
            if ready() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(self.config.poll_interval());
        }
    }
}

fn probed<D: PageDriver>(driver: &D, locator: &Locator, state: ElementState) -> bool {
    matches!(driver.probe(locator, state), Ok(true))
}

fn step<T>(step: NavigationStep, result: Result<T>) -> Result<T, NavigationError> {
    result.map_err(|source| NavigationError::new(step, source))
}
