pub mod browser;
pub mod error;
pub mod extract;
pub mod filter;
pub mod navigation;
pub mod pncp;
pub mod session;
pub mod traits;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use pncp::{PncpScraper, QueryOutcome};
pub use traits::BidSource;
pub use types::NicheFilter;
