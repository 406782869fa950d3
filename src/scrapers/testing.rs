//! Scripted browser used by the pipeline tests.

use anyhow::{anyhow, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::scrapers::session::{ElementState, Locator, PageDriver, SessionLauncher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Goto(String),
    Probe(Locator, ElementState),
    Click(Locator),
    Type(Locator, String),
    OuterHtml(Locator),
    Content,
    Screenshot,
    Quit,
}

#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn clicks(&self) -> Vec<Locator> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Click(l) => Some(l),
                _ => None,
            })
            .collect()
    }
}

/// Every element is present and clickable unless listed in `missing`.
#[derive(Clone)]
pub struct FakeDriver {
    pub log: CallLog,
    missing: Vec<Locator>,
    unclickable: Vec<Locator>,
    markup: String,
    element_html: Arc<Mutex<VecDeque<Option<String>>>>,
    fail_goto: bool,
    fail_quit: bool,
    panic_on_content: bool,
}

impl Default for FakeDriver {
    fn default() -> Self {
        Self {
            log: CallLog::default(),
            missing: Vec::new(),
            unclickable: Vec::new(),
            markup: "<html><body></body></html>".to_string(),
            element_html: Arc::default(),
            fail_goto: false,
            fail_quit: false,
            panic_on_content: false,
        }
    }
}

impl FakeDriver {
    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = markup.into();
        self
    }

    /// Successive `outer_html` answers; the last one repeats.
    pub fn with_element_html(self, script: &[Option<&str>]) -> Self {
        *self.element_html.lock().unwrap() =
            script.iter().map(|s| s.map(str::to_string)).collect();
        self
    }

    pub fn missing(mut self, locator: Locator) -> Self {
        self.missing.push(locator);
        self
    }

    pub fn unclickable(mut self, locator: Locator) -> Self {
        self.unclickable.push(locator);
        self
    }

    pub fn failing_goto(mut self) -> Self {
        self.fail_goto = true;
        self
    }

    pub fn failing_quit(mut self) -> Self {
        self.fail_quit = true;
        self
    }

    pub fn panicking_on_content(mut self) -> Self {
        self.panic_on_content = true;
        self
    }
}

impl PageDriver for FakeDriver {
    fn goto(&self, url: &str) -> Result<()> {
        self.log.push(Call::Goto(url.to_string()));
        if self.fail_goto {
            return Err(anyhow!("net::ERR_NAME_NOT_RESOLVED"));
        }
        Ok(())
    }

    fn probe(&self, locator: &Locator, state: ElementState) -> Result<bool> {
        self.log.push(Call::Probe(locator.clone(), state));
        Ok(!self.missing.contains(locator))
    }

    fn click(&self, locator: &Locator) -> Result<()> {
        self.log.push(Call::Click(locator.clone()));
        if self.missing.contains(locator) || self.unclickable.contains(locator) {
            return Err(anyhow!("element not interactable: {:?}", locator));
        }
        Ok(())
    }

    fn type_text(&self, locator: &Locator, text: &str) -> Result<()> {
        self.log.push(Call::Type(locator.clone(), text.to_string()));
        Ok(())
    }

    fn outer_html(&self, locator: &Locator) -> Result<Option<String>> {
        self.log.push(Call::OuterHtml(locator.clone()));
        if self.missing.contains(locator) {
            return Ok(None);
        }
        let mut script = self.element_html.lock().unwrap();
        let html = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        Ok(html.unwrap_or_else(|| Some(format!("<div>{:?}</div>", locator))))
    }

    fn content(&self) -> Result<String> {
        self.log.push(Call::Content);
        if self.panic_on_content {
            panic!("renderer crashed");
        }
        Ok(self.markup.clone())
    }

    fn screenshot_png(&self) -> Result<Vec<u8>> {
        self.log.push(Call::Screenshot);
        Ok(b"\x89PNG\r\n\x1a\n".to_vec())
    }

    fn quit(&mut self) -> Result<()> {
        self.log.push(Call::Quit);
        if self.fail_quit {
            return Err(anyhow!("browser already gone"));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct FakeLauncher {
    template: Option<FakeDriver>,
    pub log: CallLog,
    launches: Arc<AtomicUsize>,
}

impl FakeLauncher {
    pub fn new(driver: FakeDriver) -> Self {
        Self {
            log: driver.log.clone(),
            template: Some(driver),
            launches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            template: None,
            log: CallLog::default(),
            launches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn quits(&self) -> usize {
        self.log.count(&Call::Quit)
    }
}

impl SessionLauncher for FakeLauncher {
    type Driver = FakeDriver;

    fn launch(&self) -> Result<FakeDriver> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        self.template
            .clone()
            .ok_or_else(|| anyhow!("Could not auto detect a chrome executable"))
    }
}
