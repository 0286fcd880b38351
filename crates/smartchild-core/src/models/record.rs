use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder doctor name when the server omits one.
pub const DEFAULT_DOCTOR: &str = "Doctor";

/// Placeholder diagnosis when the server omits one.
pub const DEFAULT_DIAGNOSIS: &str = "—";

/// Workflow status of a medical record.
///
/// Unknown strings from the server are kept verbatim in `Other` so that
/// nothing the clinic writes is lost on the way to the screen.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordStatus {
    #[default]
    Open,
    Closed,
    FollowUp,
    Other(String),
}

impl RecordStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RecordStatus::Open => "Open",
            RecordStatus::Closed => "Closed",
            RecordStatus::FollowUp => "Follow-up",
            RecordStatus::Other(s) => s,
        }
    }

    /// Open records are highlighted in the list; everything else is muted.
    pub fn is_open(&self) -> bool {
        matches!(self, RecordStatus::Open)
    }
}

impl From<String> for RecordStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Open" => RecordStatus::Open,
            "Closed" => RecordStatus::Closed,
            "Follow-up" => RecordStatus::FollowUp,
            _ => RecordStatus::Other(s),
        }
    }
}

impl From<&str> for RecordStatus {
    fn from(s: &str) -> Self {
        RecordStatus::from(s.to_string())
    }
}

impl From<RecordStatus> for String {
    fn from(status: RecordStatus) -> Self {
        match status {
            RecordStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A canonical medical record as shown on the list and detail screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct MedicalRecord {
    pub record_id: i64,
    /// Visit date, `YYYY-MM-DD`. Never empty.
    pub date: String,
    pub doctor: String,
    pub hospital: Option<String>,
    pub diagnosis: String,
    pub diagnosis_code: Option<String>,
    pub treatment: Option<String>,
    pub prescription: Option<String>,
    pub notes: Option<String>,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub status: RecordStatus,
}

impl MedicalRecord {
    /// Minimal placeholder used when no tier can produce the real record.
    pub fn stub(record_id: i64, date: impl Into<String>) -> Self {
        Self {
            record_id,
            date: date.into(),
            doctor: DEFAULT_DOCTOR.to_string(),
            hospital: None,
            diagnosis: DEFAULT_DIAGNOSIS.to_string(),
            diagnosis_code: None,
            treatment: None,
            prescription: None,
            notes: None,
            status: RecordStatus::Open,
        }
    }

    /// Facility line for the detail header, if any.
    pub fn facility(&self) -> Option<&str> {
        self.hospital.as_deref()
    }
}

/// Records shown when the server is unreachable or has nothing for the child.
/// Already in display order (newest first).
pub fn sample_records() -> Vec<MedicalRecord> {
    vec![
        MedicalRecord {
            record_id: 2,
            date: "2025-09-05".to_string(),
            doctor: "K.M. Tissa Hewath".to_string(),
            hospital: Some("KCH, Trico Health".to_string()),
            diagnosis: "Skin Rash (Allergic Reaction)".to_string(),
            diagnosis_code: None,
            treatment: Some("Apply prescribed cream and avoid known allergens".to_string()),
            prescription: Some(
                concat!(
                    "Antihistamine syrup 5ml • Calamine lotion • ",
                    "Hydrocortisone cream (apply thin layer)"
                )
                .to_string(),
            ),
            notes: Some("Recheck after one week or if rash does not improve".to_string()),
            status: RecordStatus::Open,
        },
        MedicalRecord {
            record_id: 1,
            date: "2025-03-09".to_string(),
            doctor: "Dr. Kumara Senapakse".to_string(),
            hospital: Some("DGH".to_string()),
            diagnosis: "Chickenpox".to_string(),
            diagnosis_code: None,
            treatment: Some("Isolate and apply soothing lotion".to_string()),
            prescription: Some("Calamine lotion, antihistamine".to_string()),
            notes: Some("Avoid contact with other children".to_string()),
            status: RecordStatus::Closed,
        },
    ]
}
