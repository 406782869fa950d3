//! Browser session lifecycle.
//!
//! A [`DriverSession`] wraps exactly one browser process for exactly one
//! query. It is released either explicitly with [`DriverSession::release`]
//! or, on any early return or unwind, by `Drop`. The driver's `quit` runs
//! once in either case.

use anyhow::Result;
use tracing::{debug, warn};

use crate::scrapers::error::SessionLaunchError;

/// How to find an element on the rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }
}

/// Condition an element must satisfy before it is acted upon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    Present,
    Visible,
    Clickable,
}

/// Operations the navigation steps need from a live browser page.
///
/// `probe` never waits; bounded waiting is done by the caller.
pub trait PageDriver {
    fn goto(&self, url: &str) -> Result<()>;

    fn probe(&self, locator: &Locator, state: ElementState) -> Result<bool>;

    fn click(&self, locator: &Locator) -> Result<()>;

    fn type_text(&self, locator: &Locator, text: &str) -> Result<()>;

    /// Markup of the first match, `None` when nothing matches. Does not wait.
    fn outer_html(&self, locator: &Locator) -> Result<Option<String>>;

    /// Full rendered markup of the current page
    fn content(&self) -> Result<String>;

    /// PNG capture of the current viewport
    fn screenshot_png(&self) -> Result<Vec<u8>>;

    /// Terminate the browser process. Must tolerate being called on a
    /// driver whose page is in any state.
    fn quit(&mut self) -> Result<()>;
}

/// Starts browser processes
pub trait SessionLauncher {
    type Driver: PageDriver;

    fn launch(&self) -> Result<Self::Driver>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Ready,
    Closed,
}

pub struct DriverSession<D: PageDriver> {
    driver: D,
    state: SessionState,
}

impl<D: PageDriver> DriverSession<D> {
    /// Launch a fresh browser. No retry is attempted.
    pub fn acquire<L>(launcher: &L) -> Result<Self, SessionLaunchError>
    where
        L: SessionLauncher<Driver = D>,
    {
        let driver = launcher
            .launch()
            .map_err(|source| SessionLaunchError { source })?;
        debug!("Browser session ready");

        Ok(Self {
            driver,
            state: SessionState::Ready,
        })
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Terminate the browser now instead of at drop.
    pub fn release(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;

        match self.driver.quit() {
            Ok(()) => debug!("Browser session closed"),
            Err(e) => warn!("Error while closing browser session: {:#}", e),
        }
    }
}

impl<D: PageDriver> Drop for DriverSession<D> {
    fn drop(&mut self) {
        self.close();
    }
}
