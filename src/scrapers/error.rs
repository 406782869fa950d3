use std::fmt;

/// Steps driven against the portal, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationStep {
    LoadPortal,
    OpenAdvancedSearch,
    PanelSettle,
    FillSearchTerm,
    OpenRegionSelector,
    SelectRegion,
    Submit,
    ResultsSettle,
    CaptureMarkup,
}

impl NavigationStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationStep::LoadPortal => "load_portal",
            NavigationStep::OpenAdvancedSearch => "open_advanced_search",
            NavigationStep::PanelSettle => "panel_settle",
            NavigationStep::FillSearchTerm => "fill_search_term",
            NavigationStep::OpenRegionSelector => "open_region_selector",
            NavigationStep::SelectRegion => "select_region",
            NavigationStep::Submit => "submit",
            NavigationStep::ResultsSettle => "results_settle",
            NavigationStep::CaptureMarkup => "capture_markup",
        }
    }
}

impl fmt::Display for NavigationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The browser process could not be started
#[derive(thiserror::Error, Debug)]
#[error("failed to launch browser session: {source:#}")]
pub struct SessionLaunchError {
    #[source]
    pub source: anyhow::Error,
}

/// A navigation step did not complete within its bound
#[derive(thiserror::Error, Debug)]
#[error("navigation failed at step {step}: {source:#}")]
pub struct NavigationError {
    pub step: NavigationStep,
    #[source]
    pub source: anyhow::Error,
}

impl NavigationError {
    pub fn new(step: NavigationStep, source: anyhow::Error) -> Self {
        Self { step, source }
    }
}

/// Why a query produced no results
#[derive(thiserror::Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    SessionLaunch(#[from] SessionLaunchError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error("unexpected fault: {0}")]
    Unclassified(String),
}

impl QueryError {
    pub fn step(&self) -> Option<NavigationStep> {
        match self {
            QueryError::Navigation(e) => Some(e.step),
            _ => None,
        }
    }
}
