//! Data models for SmartChild records.
//!
//! - `MedicalRecord`, `RecordStatus`: the canonical record the screens render
//! - `Profile`: the signed-in child, owned by the login flow

pub mod profile;
pub mod record;

pub use profile::{Profile, PROFILE_KEY};
pub use record::{sample_records, MedicalRecord, RecordStatus, DEFAULT_DIAGNOSIS, DEFAULT_DOCTOR};
