//! Plain-text rendering of the records list and detail views.

use std::fmt::Write;

use chrono::NaiveDate;
use smartchild_core::models::{MedicalRecord, Profile};
use smartchild_core::records::RecordSource;
use smartchild_core::utils::{format_optional, human_date, truncate_string};

/// Column widths for the list view.
const DATE_WIDTH: usize = 12;
const DOCTOR_WIDTH: usize = 24;
const DIAGNOSIS_WIDTH: usize = 32;

/// Summary line above the list: name, date of birth, id, guardian.
pub fn render_header(profile: Option<&Profile>, child_id: Option<i64>) -> String {
    let mut chips = Vec::new();
    if let Some(profile) = profile {
        let name = profile.full_name();
        if !name.is_empty() {
            chips.push(name);
        }
        if let Some(ref dob) = profile.dob {
            chips.push(format!("born {}", dob));
        }
    }
    if let Some(id) = child_id {
        chips.push(format!("ID {}", id));
    }
    if let Some(guardian) = profile.and_then(|p| p.guardian_name.as_deref()) {
        chips.push(format!("guardian {}", guardian));
    }

    if chips.is_empty() {
        "Medical Records".to_string()
    } else {
        format!("Medical Records | {}", chips.join(" | "))
    }
}

pub fn render_list(records: &[MedicalRecord], source: RecordSource, today: NaiveDate) -> String {
    let mut out = String::new();

    if records.is_empty() {
        out.push_str("No medical records yet\nNew records will appear here\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<6} {:<dw$} {:<docw$} {:<diagw$} {}",
        "ID",
        "Date",
        "Doctor",
        "Diagnosis",
        "Status",
        dw = DATE_WIDTH,
        docw = DOCTOR_WIDTH,
        diagw = DIAGNOSIS_WIDTH,
    );

    for record in records {
        let status = if record.status.is_open() {
            format!("* {}", record.status)
        } else {
            format!("  {}", record.status)
        };
        let _ = writeln!(
            out,
            "{:<6} {:<dw$} {:<docw$} {:<diagw$} {}",
            record.record_id,
            human_date(&record.date, today),
            truncate_string(&record.doctor, DOCTOR_WIDTH),
            truncate_string(&record.diagnosis, DIAGNOSIS_WIDTH),
            status,
            dw = DATE_WIDTH,
            docw = DOCTOR_WIDTH,
            diagw = DIAGNOSIS_WIDTH,
        );
        let _ = writeln!(
            out,
            "{:<6} {:<dw$} {}",
            "",
            record.date,
            format_optional(&record.hospital, ""),
            dw = DATE_WIDTH,
        );
    }

    if source == RecordSource::Sample {
        out.push_str("\n(showing sample records: the records service is unavailable)\n");
    }
    out
}

pub fn render_detail(record: &MedicalRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Record #{}", record.record_id);
    let _ = writeln!(out, "{} | {} | {}", record.date, record.doctor, record.status);

    let _ = writeln!(out, "\nDiagnosis\n  {}", record.diagnosis);
    if let Some(ref code) = record.diagnosis_code {
        let _ = writeln!(out, "  Code: {}", code);
    }
    if let Some(facility) = record.facility() {
        let _ = writeln!(out, "  Facility: {}", facility);
    }

    let sections = [
        ("Treatment", &record.treatment),
        ("Prescription", &record.prescription),
        ("Notes", &record.notes),
    ];
    for (title, value) in sections {
        if let Some(text) = value {
            let _ = writeln!(out, "\n{}\n  {}", title, text);
        }
    }
    out
}
