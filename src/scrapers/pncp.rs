//! One query against PNCP, end to end.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use tracing::{error, info, warn};
use url::Url;

use crate::config::{Config, PortalConfig};
use crate::models::ResultRecord;
use crate::scrapers::browser::ChromeLauncher;
use crate::scrapers::error::{NavigationError, QueryError};
use crate::scrapers::extract::ResultExtractor;
use crate::scrapers::filter;
use crate::scrapers::navigation::NavigationController;
use crate::scrapers::session::{DriverSession, PageDriver, SessionLauncher};
use crate::scrapers::traits::BidSource;
use crate::scrapers::types::{NicheFilter, SearchQuery};
use crate::taxonomy;

/// Result of one query before it reaches a caller
#[derive(Debug)]
pub enum QueryOutcome {
    Succeeded(Vec<ResultRecord>),
    Failed(QueryError),
}

impl QueryOutcome {
    /// The public contract: failures become an empty list. Callers that
    /// need to tell "nothing matched" from "search broke" must use the
    /// outcome itself.
    pub fn into_records(self) -> Vec<ResultRecord> {
        match self {
            QueryOutcome::Succeeded(records) => records,
            QueryOutcome::Failed(_) => Vec::new(),
        }
    }
}

/// Runs queries against PNCP, one fresh browser per query
#[derive(Clone)]
pub struct PncpScraper<L: SessionLauncher> {
    launcher: L,
    navigator: NavigationController,
    extractor: ResultExtractor,
    screenshot_path: Option<PathBuf>,
}

impl PncpScraper<ChromeLauncher> {
    pub fn from_config(config: &Config) -> Result<Self> {
        let launcher = ChromeLauncher::new(config.browser.clone(), config.portal.element_timeout());
        Self::new(
            launcher,
            config.portal.clone(),
            config.diagnostics.screenshot_path.clone(),
        )
    }
}

impl<L: SessionLauncher> PncpScraper<L> {
    pub fn new(launcher: L, portal: PortalConfig, screenshot_path: Option<PathBuf>) -> Result<Self> {
        let origin = Url::parse(&portal.origin)
            .with_context(|| format!("Invalid portal origin: {}", portal.origin))?;

        Ok(Self {
            launcher,
            navigator: NavigationController::new(portal),
            extractor: ResultExtractor::new(origin),
            screenshot_path,
        })
    }

    /// Search by niche and region. Never fails; see [`QueryOutcome::into_records`].
    pub fn execute(&self, niche_id: &str, region_code: &str) -> Vec<ResultRecord> {
        self.run(&NicheFilter::new(niche_id, region_code))
            .into_records()
    }

    pub fn run(&self, filter: &NicheFilter) -> QueryOutcome {
        info!(
            "Starting PNCP search (niche: '{}', region: '{}')",
            filter.niche_id, filter.region_code
        );

        let session = match DriverSession::acquire(&self.launcher) {
            Ok(session) => session,
            Err(e) => {
                error!("PNCP search failed: {}", e);
                return QueryOutcome::Failed(e.into());
            }
        };

        let query = filter::compile(filter);
        if let Some(code) = &query.region_code {
            if !taxonomy::is_known_region(code) {
                warn!("Region code '{}' is not a known UF, using it anyway", code);
            }
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.navigate_and_extract(&session, &query)
        }));
        let outcome = match result {
            Ok(Ok(records)) => QueryOutcome::Succeeded(records),
            Ok(Err(e)) => QueryOutcome::Failed(e.into()),
            Err(payload) => QueryOutcome::Failed(QueryError::Unclassified(panic_message(payload))),
        };

        match &outcome {
            QueryOutcome::Succeeded(records) => {
                info!("PNCP search finished with {} results", records.len())
            }
            QueryOutcome::Failed(e) => {
                error!(step = ?e.step(), "PNCP search failed: {}", e);
                self.capture_diagnostics(&session);
            }
        }

        session.release();
        outcome
    }

    fn navigate_and_extract(
        &self,
        session: &DriverSession<L::Driver>,
        query: &SearchQuery,
    ) -> Result<Vec<ResultRecord>, NavigationError> {
        let markup = self.navigator.run(session.driver(), query)?;
        Ok(self.extractor.extract(&markup))
    }

    fn capture_diagnostics(&self, session: &DriverSession<L::Driver>) {
        let Some(path) = &self.screenshot_path else {
            return;
        };

        let png = match session.driver().screenshot_png() {
            Ok(png) => png,
            Err(e) => {
                warn!("Could not capture failure screenshot: {:#}", e);
                return;
            }
        };
        match std::fs::write(path, png) {
            Ok(()) => info!("Saved failure screenshot to {}", path.display()),
            Err(e) => warn!("Could not write {}: {}", path.display(), e),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

#[async_trait]
impl<L> BidSource for PncpScraper<L>
where
    L: SessionLauncher + Clone + Send + Sync + 'static,
{
    async fn search(&self, filter: NicheFilter) -> Vec<ResultRecord> {
        let scraper = self.clone();
        let task = move || scraper.execute(&filter.niche_id, &filter.region_code);
        match tokio::task::spawn_blocking(task).await {
            Ok(records) => records,
            Err(e) => {
                error!("PNCP search task aborted: {}", e);
                Vec::new()
            }
        }
    }

    fn source_name(&self) -> &'static str {
        "PNCP"
    }
}
