//! Core library for SmartChild: the record reconciliation layer behind the
//! medical-records list and detail screens.
//!
//! - `api`: HTTP client for the records service
//! - `normalize`: server JSON to canonical `MedicalRecord`
//! - `cache`: key-value store port and the last-records snapshot
//! - `records`: list fetching, detail fallback chain, repository facade
//! - `config`: on-disk configuration

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod normalize;
pub mod records;
pub mod utils;

#[cfg(test)]
mod testing;

pub use api::{ApiClient, ApiError, RecordsApi};
pub use cache::{CacheScope, FileStore, KeyValueStore, MemoryStore, RecordCache};
pub use config::Config;
pub use models::{MedicalRecord, Profile, RecordStatus};
pub use records::{
    DetailRequest, DetailResolver, FetchOutcome, LatestRecords, RecordSource, RecordsFetcher,
    RecordsRepository, Resolved,
};
