use crate::models::ResultRecord;
use crate::scrapers::types::NicheFilter;
use async_trait::async_trait;

/// Common trait for bidding announcement sources.
///
/// `search` always succeeds; a failed query yields an empty list.
#[async_trait]
pub trait BidSource: Send + Sync {
    /// Run one query against the source
    async fn search(&self, filter: NicheFilter) -> Vec<ResultRecord>;

    /// Get the name of the source
    fn source_name(&self) -> &'static str;
}
