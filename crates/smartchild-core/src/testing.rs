//! In-memory `RecordsApi` for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{ApiError, RecordsApi};

#[derive(Default)]
pub struct FakeApi {
    lists: HashMap<i64, Value>,
    records: HashMap<i64, Value>,
    delays: HashMap<i64, Duration>,
    offline: bool,
    calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request fails as if the server were unreachable.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Raw list body served for `child_id`, run through `records_from_body`.
    pub fn with_list(mut self, child_id: i64, body: Value) -> Self {
        self.lists.insert(child_id, body);
        self
    }

    pub fn with_record(mut self, record_id: i64, body: Value) -> Self {
        self.records.insert(record_id, body);
        self
    }

    /// Hold the list response for `child_id` for `delay`.
    pub fn with_delay(mut self, child_id: i64, delay: Duration) -> Self {
        self.delays.insert(child_id, delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordsApi for FakeApi {
    async fn list_records(&self, child_id: i64) -> Result<Vec<Value>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&child_id) {
            tokio::time::sleep(*delay).await;
        }
        if self.offline {
            return Err(ApiError::ServerError("connection refused".to_string()));
        }
        match self.lists.get(&child_id) {
            Some(body) => crate::api::records_from_body(body.clone()),
            None => Err(ApiError::NotFound(format!("child {}", child_id))),
        }
    }

    async fn get_record(&self, record_id: i64) -> Result<Value, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline {
            return Err(ApiError::ServerError("connection refused".to_string()));
        }
        self.records
            .get(&record_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("record {}", record_id)))
    }
}
