use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::RecordsApi;
use crate::cache::{CacheScope, KeyValueStore, RecordCache};
use crate::models::{sample_records, MedicalRecord};
use crate::normalize::normalize_list;

/// Where a fetched list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    /// The server answered with at least one element.
    Remote,
    /// Built-in sample data; the server was unavailable or had nothing.
    Sample,
}

/// Result of one list fetch.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub records: Vec<MedicalRecord>,
    pub source: RecordSource,
    /// Issue order of this fetch; higher is newer.
    pub generation: u64,
    /// A newer fetch had already written the same cache key when this one
    /// finished. Superseded results are returned but never cached.
    pub superseded: bool,
}

/// Fetches a child's record list, writing successful results through to
/// the cache and falling back to sample data on any failure.
pub struct RecordsFetcher<A: ?Sized, S: ?Sized> {
    api: Arc<A>,
    cache: RecordCache<S>,
    scoped: bool,
    generation: Arc<AtomicU64>,
    // Generation last written per cache key, held across the check and the write
    written: Arc<Mutex<HashMap<String, u64>>>,
}

impl<A: ?Sized, S: ?Sized> Clone for RecordsFetcher<A, S> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: self.cache.clone(),
            scoped: self.scoped,
            generation: Arc::clone(&self.generation),
            written: Arc::clone(&self.written),
        }
    }
}

impl<A: RecordsApi + ?Sized, S: KeyValueStore + ?Sized> RecordsFetcher<A, S> {
    pub fn new(api: Arc<A>, cache: RecordCache<S>) -> Self {
        Self {
            api,
            cache,
            scoped: true,
            generation: Arc::new(AtomicU64::new(0)),
            written: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Keep one snapshot per child (default) or a single shared snapshot.
    pub fn with_scoped_cache(mut self, scoped: bool) -> Self {
        self.scoped = scoped;
        self
    }

    pub fn scope_for(&self, child_id: Option<i64>) -> CacheScope {
        CacheScope::for_child(child_id, self.scoped)
    }

    /// Record list for `child_id`. Never fails.
    pub async fn fetch_records(&self, child_id: Option<i64>) -> Vec<MedicalRecord> {
        self.fetch(child_id).await.records
    }

    pub async fn fetch(&self, child_id: Option<i64>) -> FetchOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(child_id) = child_id else {
            debug!(generation, "No child selected, showing sample records");
            return Self::sample(generation);
        };

        let values = match self.api.list_records(child_id).await {
            Ok(values) if !values.is_empty() => values,
            Ok(_) => {
                info!(child_id, "No records on server, showing sample records");
                return Self::sample(generation);
            }
            Err(e) => {
                warn!(
                    child_id,
                    error = %e,
                    "Failed to fetch medical records, showing sample records"
                );
                return Self::sample(generation);
            }
        };

        let records = normalize_list(&values);
        let scope = self.scope_for(Some(child_id));

        let superseded = {
            let mut written = self.written.lock().await;
            let key = scope.key();
            let last = written.get(&key).copied().unwrap_or(0);
            if last > generation {
                debug!(child_id, generation, last, "Fetch superseded, not caching");
                true
            } else {
                if let Err(e) = self.cache.write(scope, &records).await {
                    warn!(child_id, error = %e, "Failed to cache medical records");
                }
                written.insert(key, generation);
                false
            }
        };

        info!(child_id, count = records.len(), "Fetched medical records");
        FetchOutcome {
            records,
            source: RecordSource::Remote,
            generation,
            superseded,
        }
    }

    fn sample(generation: u64) -> FetchOutcome {
        FetchOutcome {
            records: sample_records(),
            source: RecordSource::Sample,
            generation,
            superseded: false,
        }
    }
}

/// The list a view is currently showing.
///
/// Outcomes are applied as they complete; one that is older than what is
/// already shown is ignored, so a slow refresh cannot overwrite a newer one.
#[derive(Debug, Clone, Default)]
pub struct LatestRecords {
    generation: u64,
    records: Vec<MedicalRecord>,
    source: Option<RecordSource>,
}

impl LatestRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the outcome was older than the current list.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.generation < self.generation {
            debug!(
                stale = outcome.generation,
                current = self.generation,
                "Ignoring stale record list"
            );
            return false;
        }
        self.generation = outcome.generation;
        self.records = outcome.records;
        self.source = Some(outcome.source);
        true
    }

    pub fn records(&self) -> &[MedicalRecord] {
        &self.records
    }

    pub fn source(&self) -> Option<RecordSource> {
        self.source
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
