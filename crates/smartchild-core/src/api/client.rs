//! HTTP client for the SmartChild medical-records endpoints.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::ApiError;

/// Remote source of medical records.
///
/// Responses are returned as raw JSON: the server's field names vary and
/// are reconciled by `crate::normalize`, not here.
#[async_trait]
pub trait RecordsApi: Send + Sync {
    /// `GET /medical-records?child_id={child_id}`
    async fn list_records(&self, child_id: i64) -> Result<Vec<Value>, ApiError>;

    /// `GET /medical-records/{record_id}`
    async fn get_record(&self, record_id: i64) -> Result<Value, ApiError>;
}

/// API client for the records service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:5000/api`).
    /// Without `timeout` the transport default applies.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get_json(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<Value, ApiError> {
        let response = Self::check_response(request.send().await?).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{} is not JSON: {}", what, e)))
    }
}

/// The list endpoint returns a bare array; the admin flavour of the same
/// route wraps it as `{ "items": [...], "total": n }`.
pub fn records_from_body(body: Value) -> Result<Vec<Value>, ApiError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => match obj.remove("items") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ApiError::InvalidResponse(
                "record list object has no items array".to_string(),
            )),
        },
        other => Err(ApiError::InvalidResponse(format!(
            "expected a record list, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl RecordsApi for ApiClient {
    async fn list_records(&self, child_id: i64) -> Result<Vec<Value>, ApiError> {
        let url = format!("{}/medical-records", self.base_url);
        debug!(url = %url, child_id, "Fetching medical records");

        let request = self.client.get(&url).query(&[("child_id", child_id)]);
        let body = self.get_json(request, "record list").await?;
        records_from_body(body)
    }

    async fn get_record(&self, record_id: i64) -> Result<Value, ApiError> {
        let url = format!("{}/medical-records/{}", self.base_url, record_id);
        debug!(url = %url, "Fetching medical record");

        let request = self.client.get(&url);
        self.get_json(request, "record").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_from_bare_array() {
        let items = records_from_body(json!([{"record_id": 1}, {"record_id": 2}])).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_records_from_items_envelope() {
        let body = json!({"items": [{"record_id": 1, "visit_date": "2025-01-01"}], "total": 1});
        let items = records_from_body(body).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["visit_date"], "2025-01-01");
    }

    #[test]
    fn test_records_from_unexpected_shapes() {
        assert!(matches!(
            records_from_body(json!({"message": "Server error"})),
            Err(ApiError::InvalidResponse(_))
        ));
        assert!(matches!(
            records_from_body(json!({"items": "nope"})),
            Err(ApiError::InvalidResponse(_))
        ));
        assert!(matches!(
            records_from_body(Value::Null),
            Err(ApiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("http://localhost:5000/api/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api");
    }
}
