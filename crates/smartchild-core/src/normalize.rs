//! Mapping from loosely-shaped server JSON to canonical `MedicalRecord`s.
//!
//! The list and detail endpoints have shipped several column names over
//! time (`date` vs `visit_date`, `doctor` vs `doctor_name`, ...). Every
//! accepted spelling is listed in [`Field::aliases`]; the first alias that
//! yields a non-blank value wins.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::models::{MedicalRecord, RecordStatus, DEFAULT_DIAGNOSIS, DEFAULT_DOCTOR};

/// Date format used everywhere records are stored or compared.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Where a field value may be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alias {
    /// Take the value of this key as-is.
    Key(&'static str),
    /// Take the first 10 characters of this key (a timestamp's date part).
    DatePrefixOf(&'static str),
}

/// Canonical record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    RecordId,
    Date,
    Doctor,
    Hospital,
    Diagnosis,
    DiagnosisCode,
    Treatment,
    Prescription,
    Notes,
    Status,
}

impl Field {
    /// Accepted source keys for this field, in priority order.
    pub const fn aliases(self) -> &'static [Alias] {
        match self {
            Field::RecordId => &[Alias::Key("record_id")],
            Field::Date => &[
                Alias::Key("date"),
                Alias::Key("visit_date"),
                Alias::DatePrefixOf("created_at"),
            ],
            Field::Doctor => &[Alias::Key("doctor"), Alias::Key("doctor_name")],
            Field::Hospital => &[Alias::Key("hospital")],
            Field::Diagnosis => &[Alias::Key("diagnosis")],
            Field::DiagnosisCode => &[Alias::Key("diagnosis_code")],
            Field::Treatment => &[Alias::Key("treatment"), Alias::Key("plan")],
            Field::Prescription => &[Alias::Key("prescription")],
            Field::Notes => &[Alias::Key("notes")],
            Field::Status => &[Alias::Key("status")],
        }
    }
}

/// A record-like object with aliases resolved but no defaults applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub record_id: Option<i64>,
    pub date: Option<String>,
    pub doctor: Option<String>,
    pub hospital: Option<String>,
    pub diagnosis: Option<String>,
    pub diagnosis_code: Option<String>,
    pub treatment: Option<String>,
    pub prescription: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
}

impl RawRecord {
    /// Resolve every field of a JSON object through the alias table.
    /// Returns `None` when the value is not an object at all.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let record_id = Field::RecordId
            .aliases()
            .iter()
            .find_map(|alias| match alias {
                Alias::Key(key) => obj.get(*key).and_then(id_from_value),
                Alias::DatePrefixOf(_) => None,
            });

        Some(Self {
            record_id,
            date: resolve(obj, Field::Date).map(|d| calendar_date(&d)),
            doctor: resolve(obj, Field::Doctor),
            hospital: resolve(obj, Field::Hospital),
            diagnosis: resolve(obj, Field::Diagnosis),
            diagnosis_code: resolve(obj, Field::DiagnosisCode),
            treatment: resolve(obj, Field::Treatment),
            prescription: resolve(obj, Field::Prescription),
            notes: resolve(obj, Field::Notes),
            status: resolve(obj, Field::Status),
        })
    }

    /// Apply defaults. `fallback_id` is used when the object carries no usable id.
    /// Returns `None` if no date could be resolved.
    pub fn into_record(self, fallback_id: i64) -> Option<MedicalRecord> {
        let date = self.date?;
        Some(MedicalRecord {
            record_id: self.record_id.unwrap_or(fallback_id),
            date,
            doctor: self.doctor.unwrap_or_else(|| DEFAULT_DOCTOR.to_string()),
            hospital: self.hospital,
            diagnosis: self.diagnosis.unwrap_or_else(|| DEFAULT_DIAGNOSIS.to_string()),
            diagnosis_code: self.diagnosis_code,
            treatment: self.treatment,
            prescription: self.prescription,
            notes: self.notes,
            status: self.status.map(RecordStatus::from).unwrap_or_default(),
        })
    }
}

fn resolve(obj: &Map<String, Value>, field: Field) -> Option<String> {
    field.aliases().iter().find_map(|alias| match alias {
        Alias::Key(key) => obj.get(*key).and_then(text_from_value),
        Alias::DatePrefixOf(key) => obj
            .get(*key)
            .and_then(text_from_value)
            .map(|s| s.chars().take(10).collect()),
    })
}

/// Text for a JSON scalar. Blank strings, nulls, arrays, objects and
/// booleans count as absent.
fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        _ => None,
    }
}

fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        match n.as_f64() {
            // 7.0 and 7 name the same record
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
            _ => n.to_string(),
        }
    }
}

/// Integer id from a number or a numeric string.
// Floats at or beyond this would saturate when cast to i64.
const MAX_FLOAT_ID: f64 = 9.2e18;

pub fn id_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < MAX_FLOAT_ID)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Id as text, so that `7` and `"7"` compare equal.
pub fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(number_text(n)),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Reduce full timestamps to their calendar date; anything else is kept.
fn calendar_date(value: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.format(DATE_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return dt.format(DATE_FORMAT).to_string();
    }
    value.to_string()
}

/// Normalize one list element. `fallback_id` stands in for a missing id.
pub fn normalize_value(value: &Value, fallback_id: i64) -> Option<MedicalRecord> {
    RawRecord::from_value(value)?.into_record(fallback_id)
}

/// Normalize a list response: map, drop rejects, sort newest first.
pub fn normalize_list(values: &[Value]) -> Vec<MedicalRecord> {
    let mut records: Vec<MedicalRecord> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| normalize_value(v, i as i64 + 1))
        .collect();

    let rejected = values.len() - records.len();
    if rejected > 0 {
        debug!(rejected, kept = records.len(), "Dropped records without a usable date");
    }

    sort_records(&mut records);
    records
}

/// Normalize a single-record response. A missing date becomes `today` and a
/// missing id becomes the id that was asked for.
pub fn normalize_detail(
    value: &Value,
    requested_id: i64,
    today: NaiveDate,
) -> Option<MedicalRecord> {
    let mut raw = RawRecord::from_value(value)?;
    if raw.date.is_none() {
        raw.date = Some(today.format(DATE_FORMAT).to_string());
    }
    raw.into_record(requested_id)
}

/// Newest first; records on the same day are ordered by id, highest first.
pub fn sort_records(records: &mut [MedicalRecord]) {
    records.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.record_id.cmp(&a.record_id))
    });
}
