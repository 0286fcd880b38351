//! Local persistence for offline access.
//!
//! `KeyValueStore` is the platform's string storage (`MemoryStore`,
//! `FileStore`). `RecordCache` keeps the last fetched record list on top of
//! it, one snapshot per `CacheScope`. There is no expiry: a snapshot is
//! replaced by the next successful fetch and nothing else.

pub mod manager;
pub mod store;

pub use manager::{CacheScope, CachedData, RecordCache, LAST_RECORDS_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore};
