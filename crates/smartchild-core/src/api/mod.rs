//! REST API client module for the SmartChild records service.
//!
//! `RecordsApi` is the seam the reconciliation layer talks to; `ApiClient`
//! is the reqwest implementation. Requests are unauthenticated: the
//! service scopes data by `child_id` only.

pub mod client;
pub mod error;

pub use client::{records_from_body, ApiClient, RecordsApi};
pub use error::ApiError;
