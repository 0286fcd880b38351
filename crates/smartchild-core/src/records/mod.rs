//! Record reconciliation: list fetching with write-through caching and
//! sample fallback, and the detail fallback chain.
//!
//! Nothing here returns an error to the caller. A failed request degrades
//! to the next source (cache, then stub or sample data) and is logged.

pub mod fetcher;
pub mod repository;
pub mod resolver;

pub use fetcher::{FetchOutcome, LatestRecords, RecordSource, RecordsFetcher};
pub use repository::RecordsRepository;
pub use resolver::{
    CacheTier, DetailRequest, DetailResolver, NetworkTier, Resolution, Resolved, ResolverTier,
    StubTier,
};
