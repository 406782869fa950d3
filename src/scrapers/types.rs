use serde::{Deserialize, Serialize};

use crate::taxonomy::ALL_NICHES;

/// Filter requested by a caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NicheFilter {
    /// Niche id, "todos"/"all" for no keyword filtering
    pub niche_id: String,
    /// Region code (UF); empty means no region filter
    pub region_code: String,
}

impl NicheFilter {
    pub fn new(niche_id: impl Into<String>, region_code: impl Into<String>) -> Self {
        Self {
            niche_id: niche_id.into(),
            region_code: region_code.into(),
        }
    }
}

impl Default for NicheFilter {
    fn default() -> Self {
        Self::new(ALL_NICHES, "")
    }
}

/// Search term and region ready to be typed into the portal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term_text: String,
    /// Passed through unvalidated
    pub region_code: Option<String>,
}
