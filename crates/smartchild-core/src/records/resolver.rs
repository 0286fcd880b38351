use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use crate::api::RecordsApi;
use crate::cache::{CacheScope, KeyValueStore, RecordCache};
use crate::models::MedicalRecord;
use crate::normalize::{id_text, normalize_detail, normalize_value, DATE_FORMAT};

/// A request for one record's detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailRequest {
    pub record_id: i64,
    /// Which cached list to search if the server can't answer.
    pub scope: CacheScope,
    /// Date given to records that have none.
    pub today: NaiveDate,
}

impl DetailRequest {
    pub fn new(record_id: i64, scope: CacheScope) -> Self {
        Self {
            record_id,
            scope,
            today: Local::now().date_naive(),
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn today_string(&self) -> String {
        self.today.format(DATE_FORMAT).to_string()
    }
}

/// What a tier made of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(MedicalRecord),
    /// Not answerable here; try the next tier.
    Pass,
}

/// One source in the detail fallback chain.
#[async_trait]
pub trait ResolverTier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(&self, request: &DetailRequest) -> Resolution;
}

/// Asks the server for the record.
pub struct NetworkTier<A: ?Sized> {
    api: Arc<A>,
}

impl<A: ?Sized> NetworkTier<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl<A: RecordsApi + ?Sized> ResolverTier for NetworkTier<A> {
    fn name(&self) -> &'static str {
        "network"
    }

    async fn resolve(&self, request: &DetailRequest) -> Resolution {
        match self.api.get_record(request.record_id).await {
            Ok(value) => match normalize_detail(&value, request.record_id, request.today) {
                Some(record) => Resolution::Resolved(record),
                None => {
                    debug!(record_id = request.record_id, "Record response was not an object");
                    Resolution::Pass
                }
            },
            Err(e) if e.is_not_found() => {
                debug!(record_id = request.record_id, "Record not on server");
                Resolution::Pass
            }
            Err(e) => {
                warn!(record_id = request.record_id, error = %e, "Failed to fetch medical record");
                Resolution::Pass
            }
        }
    }
}

/// Looks the record up in the last cached list.
pub struct CacheTier<S: ?Sized> {
    cache: RecordCache<S>,
}

impl<S: ?Sized> CacheTier<S> {
    pub fn new(cache: RecordCache<S>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> ResolverTier for CacheTier<S> {
    fn name(&self) -> &'static str {
        "cache"
    }

    async fn resolve(&self, request: &DetailRequest) -> Resolution {
        let Some(cached) = self.cache.read_raw(request.scope).await else {
            return Resolution::Pass;
        };

        // Ids are compared as text: cached lists may hold 7 or "7"
        let wanted = request.record_id.to_string();
        let found = cached
            .data
            .iter()
            .filter(|v| v.get("record_id").and_then(id_text).as_deref() == Some(wanted.as_str()))
            .find_map(|v| normalize_value(v, request.record_id));

        match found {
            Some(record) => Resolution::Resolved(record),
            None => {
                debug!(
                    record_id = request.record_id,
                    scope = %request.scope.key(),
                    "Record not in cache"
                );
                Resolution::Pass
            }
        }
    }
}

/// Always answers with a placeholder record.
pub struct StubTier;

#[async_trait]
impl ResolverTier for StubTier {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn resolve(&self, request: &DetailRequest) -> Resolution {
        Resolution::Resolved(MedicalRecord::stub(request.record_id, request.today_string()))
    }
}

/// A resolved record and the tier that produced it.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub record: MedicalRecord,
    pub tier: &'static str,
}

/// Tries each tier in order until one resolves.
pub struct DetailResolver {
    tiers: Vec<Box<dyn ResolverTier>>,
}

impl DetailResolver {
    pub fn new(tiers: Vec<Box<dyn ResolverTier>>) -> Self {
        Self { tiers }
    }

    /// Network, then cache, then stub.
    pub fn standard<A, S>(api: Arc<A>, cache: RecordCache<S>) -> Self
    where
        A: RecordsApi + ?Sized + 'static,
        S: KeyValueStore + ?Sized + 'static,
    {
        Self::new(vec![
            Box::new(NetworkTier::new(api)),
            Box::new(CacheTier::new(cache)),
            Box::new(StubTier),
        ])
    }

    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|t| t.name()).collect()
    }

    pub async fn resolve(&self, request: &DetailRequest) -> Resolved {
        for tier in &self.tiers {
            if let Resolution::Resolved(record) = tier.resolve(request).await {
                debug!(
                    record_id = request.record_id,
                    tier = tier.name(),
                    "Resolved medical record"
                );
                return Resolved {
                    record,
                    tier: tier.name(),
                };
            }
        }

        // A chain without a stub tier still has to answer
        Resolved {
            record: MedicalRecord::stub(request.record_id, request.today_string()),
            tier: StubTier.name(),
        }
    }

    /// The record for `request`. Never fails.
    pub async fn resolve_record(&self, request: &DetailRequest) -> MedicalRecord {
        self.resolve(request).await.record
    }
}
