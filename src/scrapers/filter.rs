//! Compiles a niche filter into the search term typed into the portal.

use crate::scrapers::types::{NicheFilter, SearchQuery};
use crate::taxonomy;

/// Term used when a niche contributes no keywords.
pub const FALLBACK_TERM: &str = "serviços";

/// Join the niche's keywords in declared order, or fall back to "serviços".
pub fn compile_term(niche_id: &str) -> String {
    let term = taxonomy::keywords(niche_id).join(" ");
    if term.is_empty() {
        FALLBACK_TERM.to_string()
    } else {
        term
    }
}

pub fn compile(filter: &NicheFilter) -> SearchQuery {
    let region_code = if filter.region_code.is_empty() {
        None
    } else {
        Some(filter.region_code.clone())
    };

    SearchQuery {
        term_text: compile_term(&filter.niche_id),
        region_code,
    }
}
