use anyhow::{anyhow, Context, Result};
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::ffi::{OsStr, OsString};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::BrowserConfig;
use crate::scrapers::session::{ElementState, Locator, PageDriver, SessionLauncher};

/// True when the element has a layout box and is not hidden.
const VISIBLE_JS: &str = r#"
function() {
    const style = window.getComputedStyle(this);
    const rect = this.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden' && style.display !== 'none';
}
"#;

/// Visible, not disabled, and accepting pointer events.
const CLICKABLE_JS: &str = r#"
function() {
    const style = window.getComputedStyle(this);
    const rect = this.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden' && style.display !== 'none'
        && style.pointerEvents !== 'none' && !this.disabled;
}
"#;

/// Launches headless Chrome configured for a server without OS sandboxing
#[derive(Clone)]
pub struct ChromeLauncher {
    config: BrowserConfig,
    page_timeout: Duration,
}

impl ChromeLauncher {
    pub fn new(config: BrowserConfig, page_timeout: Duration) -> Self {
        Self {
            config,
            page_timeout,
        }
    }
}

impl SessionLauncher for ChromeLauncher {
    type Driver = ChromeDriver;

    fn launch(&self) -> Result<ChromeDriver> {
        info!("Launching headless Chrome...");

        let user_agent = OsString::from(format!("--user-agent={}", self.config.user_agent));
        let args: Vec<&OsStr> = vec![
            OsStr::new("--disable-gpu"),
            OsStr::new("--disable-dev-shm-usage"),
            user_agent.as_os_str(),
        ];

        let options = LaunchOptions::default_builder()
            .headless(self.config.headless)
            .sandbox(false)
            .window_size(Some((self.config.window_width, self.config.window_height)))
            .path(self.config.chrome_path.clone())
            .idle_browser_timeout(Duration::from_secs(self.config.idle_timeout_secs))
            .args(args)
            .build()
            .context("Failed to build launch options")?;

        // If anything below fails, `browser` is dropped and Chrome is killed.
        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;
        tab.set_default_timeout(self.page_timeout);
        tab.set_user_agent(&self.config.user_agent, None, None)
            .context("Failed to set user agent")?;

        Ok(ChromeDriver {
            browser: Some(browser),
            tab,
        })
    }
}

/// One Chrome process and the tab the query runs in
pub struct ChromeDriver {
    browser: Option<Browser>,
    tab: Arc<Tab>,
}

impl ChromeDriver {
    fn find(&self, locator: &Locator) -> Result<Element<'_>> {
        let element = match locator {
            Locator::Css(selector) => self.tab.find_element(selector),
            Locator::XPath(expr) => self.tab.find_element_by_xpath(expr),
        };
        element.with_context(|| format!("Element not found: {:?}", locator))
    }

    fn eval_bool(element: &Element<'_>, function: &str) -> Result<bool> {
        let result = element.call_js_fn(function, vec![], false)?;
        Ok(matches!(result.value, Some(serde_json::Value::Bool(true))))
    }
}

impl PageDriver for ChromeDriver {
    fn goto(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .with_context(|| format!("Failed to navigate to {}", url))?
            .wait_until_navigated()
            .context("Page did not finish loading")?;
        Ok(())
    }

    fn probe(&self, locator: &Locator, state: ElementState) -> Result<bool> {
        let element = match self.find(locator) {
            Ok(element) => element,
            Err(_) => return Ok(false),
        };

        match state {
            ElementState::Present => Ok(true),
            ElementState::Visible => Self::eval_bool(&element, VISIBLE_JS),
            ElementState::Clickable => Self::eval_bool(&element, CLICKABLE_JS),
        }
    }

    fn click(&self, locator: &Locator) -> Result<()> {
        self.find(locator)?
            .click()
            .with_context(|| format!("Failed to click {:?}", locator))?;
        Ok(())
    }

    fn type_text(&self, locator: &Locator, text: &str) -> Result<()> {
        self.find(locator)?
            .type_into(text)
            .with_context(|| format!("Failed to type into {:?}", locator))?;
        Ok(())
    }

    fn outer_html(&self, locator: &Locator) -> Result<Option<String>> {
        match self.find(locator) {
            Ok(element) => element
                .get_content()
                .map(Some)
                .with_context(|| format!("Failed to read markup of {:?}", locator)),
            Err(_) => Ok(None),
        }
    }

    fn content(&self) -> Result<String> {
        self.tab.get_content().context("Failed to read page HTML")
    }

    fn screenshot_png(&self) -> Result<Vec<u8>> {
        self.tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, None, true)
            .context("Failed to capture screenshot")
    }

    fn quit(&mut self) -> Result<()> {
        let browser = self
            .browser
            .take()
            .ok_or_else(|| anyhow!("Browser already closed"))?;

        if let Err(e) = self.tab.close(false) {
            debug!("Tab close failed: {:#}", e);
        }
        // Dropping the last handle kills the Chrome process.
        drop(browser);
        info!("Chrome browser closed");
        Ok(())
    }
}
