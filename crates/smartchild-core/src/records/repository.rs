use std::sync::Arc;

use anyhow::Result;

use super::{DetailRequest, DetailResolver, FetchOutcome, RecordsFetcher, Resolved};
use crate::api::{ApiClient, RecordsApi};
use crate::cache::{CachedData, FileStore, KeyValueStore, RecordCache};
use crate::config::Config;
use crate::models::{MedicalRecord, Profile};

/// What the list and detail screens talk to.
///
/// Reads the signed-in child from the profile stored under `sc_user` and
/// routes list and detail requests through the fetcher and resolver with
/// that child's cache scope.
pub struct RecordsRepository<A: ?Sized, S: ?Sized> {
    store: Arc<S>,
    cache: RecordCache<S>,
    fetcher: RecordsFetcher<A, S>,
    resolver: DetailResolver,
}

impl RecordsRepository<ApiClient, FileStore> {
    /// Production wiring: HTTP client plus file-backed store.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = ApiClient::new(&config.api_base_url(), config.request_timeout())?;
        let store = FileStore::new(config.cache_dir()?)?;
        Ok(Self::new(Arc::new(api), Arc::new(store)).with_scoped_cache(config.scope_cache_by_child))
    }
}

impl<A, S> RecordsRepository<A, S>
where
    A: RecordsApi + ?Sized + 'static,
    S: KeyValueStore + ?Sized + 'static,
{
    pub fn new(api: Arc<A>, store: Arc<S>) -> Self {
        let cache = RecordCache::new(Arc::clone(&store));
        Self {
            fetcher: RecordsFetcher::new(Arc::clone(&api), cache.clone()),
            resolver: DetailResolver::standard(api, cache.clone()),
            cache,
            store,
        }
    }

    pub fn with_scoped_cache(mut self, scoped: bool) -> Self {
        self.fetcher = self.fetcher.with_scoped_cache(scoped);
        self
    }

    pub fn fetcher(&self) -> &RecordsFetcher<A, S> {
        &self.fetcher
    }

    pub fn resolver(&self) -> &DetailResolver {
        &self.resolver
    }

    pub async fn profile(&self) -> Option<Profile> {
        Profile::load(self.store.as_ref()).await
    }

    pub async fn current_child(&self) -> Option<i64> {
        self.profile().await.and_then(|p| p.child_id())
    }

    /// List for the signed-in child.
    pub async fn load_records(&self) -> FetchOutcome {
        let child_id = self.current_child().await;
        self.fetcher.fetch(child_id).await
    }

    /// List for an explicit child, bypassing the profile.
    pub async fn load_records_for(&self, child_id: Option<i64>) -> FetchOutcome {
        self.fetcher.fetch(child_id).await
    }

    /// Detail for a record of the signed-in child.
    pub async fn open_record(&self, record_id: i64) -> Resolved {
        let child_id = self.current_child().await;
        self.open_record_for(child_id, record_id).await
    }

    pub async fn open_record_for(&self, child_id: Option<i64>, record_id: i64) -> Resolved {
        let request = DetailRequest::new(record_id, self.fetcher.scope_for(child_id));
        self.resolver.resolve(&request).await
    }

    /// The last list written for `child_id`, if any.
    pub async fn cached_records(
        &self,
        child_id: Option<i64>,
    ) -> Option<CachedData<Vec<MedicalRecord>>> {
        self.cache.read(self.fetcher.scope_for(child_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheScope, MemoryStore};
    use crate::models::PROFILE_KEY;
    use crate::records::RecordSource;
    use crate::testing::FakeApi;
    use serde_json::json;

    async fn sign_in(store: &MemoryStore, child_id: i64) {
        store
            .set(PROFILE_KEY, &json!({"child_id": child_id, "first_name": "Test"}).to_string())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_uses_profile_child() {
        let store = Arc::new(MemoryStore::new());
        sign_in(&store, 1).await;
        let api = FakeApi::new().with_list(1, json!([{"record_id": 9, "date": "2025-08-08"}]));
        let repo = RecordsRepository::new(Arc::new(api), Arc::clone(&store));

        assert_eq!(repo.current_child().await, Some(1));
        let outcome = repo.load_records().await;
        assert_eq!(outcome.source, RecordSource::Remote);
        assert_eq!(outcome.records[0].record_id, 9);

        let cached = repo.cached_records(Some(1)).await.unwrap();
        assert_eq!(cached.data, outcome.records);
    }

    #[tokio::test]
    async fn test_signed_out_gets_samples() {
        let repo = RecordsRepository::new(Arc::new(FakeApi::new()), Arc::new(MemoryStore::new()));

        let outcome = repo.load_records().await;
        assert_eq!(outcome.source, RecordSource::Sample);
        assert!(repo.profile().await.is_none());
    }

    #[tokio::test]
    async fn test_switching_child_does_not_leak_cached_records() {
        let store = Arc::new(MemoryStore::new());
        let api = FakeApi::new().with_list(
            1,
            json!([{"record_id": 9, "date": "2025-08-08", "diagnosis": "Measles"}]),
        );
        let repo = RecordsRepository::new(Arc::new(api), Arc::clone(&store));

        sign_in(&store, 1).await;
        repo.load_records().await;
        let resolved = repo.open_record(9).await;
        assert_eq!(resolved.tier, "cache");
        assert_eq!(resolved.record.diagnosis, "Measles");

        sign_in(&store, 2).await;
        let resolved = repo.open_record(9).await;
        assert_eq!(resolved.tier, "stub");
        assert_eq!(resolved.record.diagnosis, "—");
    }

    #[tokio::test]
    async fn test_unscoped_repository_shares_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let api = FakeApi::new().with_list(1, json!([{"record_id": 9, "date": "2025-08-08"}]));
        let repo =
            RecordsRepository::new(Arc::new(api), Arc::clone(&store)).with_scoped_cache(false);

        repo.load_records_for(Some(1)).await;
        let resolved = repo.open_record_for(Some(2), 9).await;
        assert_eq!(resolved.tier, "cache");
        assert_eq!(repo.fetcher().scope_for(Some(2)), CacheScope::Shared);
    }
}
