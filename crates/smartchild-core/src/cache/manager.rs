use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::KeyValueStore;
use crate::models::MedicalRecord;
use crate::normalize::normalize_list;

/// Store key for the last successfully fetched record list.
pub const LAST_RECORDS_KEY: &str = "__last_records__";

/// Which snapshot a cache operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheScope {
    /// The single unscoped snapshot, shared by whoever fetched last.
    Shared,
    /// The snapshot belonging to one child.
    Child(i64),
}

impl CacheScope {
    /// Scope for a child. With scoping disabled every child shares one key.
    pub fn for_child(child_id: Option<i64>, scoped: bool) -> Self {
        match child_id {
            Some(id) if scoped => CacheScope::Child(id),
            _ => CacheScope::Shared,
        }
    }

    pub fn key(&self) -> String {
        match self {
            CacheScope::Shared => LAST_RECORDS_KEY.to_string(),
            CacheScope::Child(id) => format!("{}:{}", LAST_RECORDS_KEY, id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    /// Absent for snapshots written before timestamps were recorded.
    #[serde(default)]
    pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Some(Utc::now()),
        }
    }

    pub fn age_minutes(&self) -> Option<i64> {
        self.cached_at.map(|at| (Utc::now() - at).num_minutes())
    }

    pub fn age_display(&self) -> String {
        let minutes = match self.age_minutes() {
            Some(m) => m,
            None => return "unknown".to_string(),
        };
        if minutes < 1 {
            // Negative on clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

/// Either the current envelope or a bare array from older writers.
#[derive(Deserialize)]
#[serde(untagged)]
enum Snapshot {
    Envelope(CachedData<Vec<Value>>),
    Bare(Vec<Value>),
}

/// Typed access to the record snapshots kept in a `KeyValueStore`.
///
/// Reads never fail: a missing key, an unreadable store and a corrupt
/// payload all come back as `None`.
pub struct RecordCache<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for RecordCache<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore + ?Sized> RecordCache<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Overwrite the snapshot for `scope`.
    pub async fn write(&self, scope: CacheScope, records: &[MedicalRecord]) -> Result<()> {
        let cached = CachedData::new(records);
        let contents = serde_json::to_string(&cached)?;
        self.store.set(&scope.key(), &contents).await
    }

    /// The snapshot as raw JSON elements, ids untouched.
    pub async fn read_raw(&self, scope: CacheScope) -> Option<CachedData<Vec<Value>>> {
        let key = scope.key();
        let contents = match self.store.get(&key).await {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                debug!(cache = %key, "No cached records");
                return None;
            }
            Err(e) => {
                debug!(cache = %key, error = %e, "Failed to read cached records");
                return None;
            }
        };

        match serde_json::from_str::<Snapshot>(&contents) {
            Ok(Snapshot::Envelope(cached)) => Some(cached),
            Ok(Snapshot::Bare(data)) => Some(CachedData {
                data,
                cached_at: None,
            }),
            Err(e) => {
                debug!(cache = %key, error = %e, "Failed to parse cached records");
                None
            }
        }
    }

    /// The snapshot as canonical records.
    pub async fn read(&self, scope: CacheScope) -> Option<CachedData<Vec<MedicalRecord>>> {
        let raw = self.read_raw(scope).await?;
        Some(CachedData {
            data: normalize_list(&raw.data),
            cached_at: raw.cached_at,
        })
    }

    pub async fn clear(&self, scope: CacheScope) -> Result<()> {
        self.store.remove(&scope.key()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::models::sample_records;
    use chrono::Duration;

    fn cache() -> RecordCache<MemoryStore> {
        RecordCache::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_scope_keys() {
        assert_eq!(CacheScope::Shared.key(), "__last_records__");
        assert_eq!(CacheScope::Child(12).key(), "__last_records__:12");
        assert_eq!(CacheScope::for_child(Some(12), true), CacheScope::Child(12));
        assert_eq!(CacheScope::for_child(Some(12), false), CacheScope::Shared);
        assert_eq!(CacheScope::for_child(None, true), CacheScope::Shared);
    }

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_age_display_rounding() {
        let mut cached = CachedData::new(vec![1]);
        cached.cached_at = Some(Utc::now() - Duration::minutes(95));
        assert_eq!(cached.age_display(), "2h ago");

        cached.cached_at = Some(Utc::now() - Duration::minutes(5));
        assert_eq!(cached.age_display(), "5m ago");

        cached.cached_at = Some(Utc::now() - Duration::hours(26));
        assert_eq!(cached.age_display(), "1d ago");
    }

    #[test]
    fn test_cached_data_without_timestamp() {
        let cached = CachedData {
            data: vec![1],
            cached_at: None,
        };
        assert_eq!(cached.age_minutes(), None);
        assert_eq!(cached.age_display(), "unknown");
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let cache = cache();
        let records = sample_records();
        cache.write(CacheScope::Child(1), &records).await.unwrap();

        let cached = cache.read(CacheScope::Child(1)).await.unwrap();
        assert_eq!(cached.data, records);
        assert!(cached.cached_at.is_some());
    }

    #[tokio::test]
    async fn test_write_overwrites() {
        let cache = cache();
        cache.write(CacheScope::Shared, &sample_records()).await.unwrap();
        cache
            .write(CacheScope::Shared, &[MedicalRecord::stub(5, "2025-01-01")])
            .await
            .unwrap();

        let cached = cache.read(CacheScope::Shared).await.unwrap();
        assert_eq!(cached.data.len(), 1);
        assert_eq!(cached.data[0].record_id, 5);
    }

    #[tokio::test]
    async fn test_scopes_are_isolated() {
        let cache = cache();
        cache.write(CacheScope::Child(1), &sample_records()).await.unwrap();

        assert!(cache.read(CacheScope::Child(2)).await.is_none());
        assert!(cache.read(CacheScope::Shared).await.is_none());
    }

    #[tokio::test]
    async fn test_reads_bare_legacy_array() {
        let cache = cache();
        cache
            .store()
            .set(
                LAST_RECORDS_KEY,
                r#"[{"record_id": "7", "date": "2025-01-01", "doctor": "Dr. L"}]"#,
            )
            .await
            .unwrap();

        let raw = cache.read_raw(CacheScope::Shared).await.unwrap();
        assert!(raw.cached_at.is_none());
        assert_eq!(raw.data.len(), 1);

        let typed = cache.read(CacheScope::Shared).await.unwrap();
        assert_eq!(typed.data[0].record_id, 7);
        assert_eq!(typed.data[0].doctor, "Dr. L");
    }

    #[tokio::test]
    async fn test_corrupt_payload_reads_as_absent() {
        let cache = cache();
        cache.store().set(LAST_RECORDS_KEY, "{oops").await.unwrap();
        assert!(cache.read_raw(CacheScope::Shared).await.is_none());

        cache.store().set(LAST_RECORDS_KEY, r#"{"data": 5}"#).await.unwrap();
        assert!(cache.read(CacheScope::Shared).await.is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = cache();
        cache.write(CacheScope::Child(3), &sample_records()).await.unwrap();
        cache.clear(CacheScope::Child(3)).await.unwrap();
        assert!(cache.read(CacheScope::Child(3)).await.is_none());
    }
}
