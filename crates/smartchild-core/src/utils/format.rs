use chrono::{Datelike, NaiveDate};

use crate::normalize::DATE_FORMAT;

/// Relative label for a record date, as shown in the list's date column:
/// "Today", "Yesterday", "3 days ago", then "Sep 5" or "Sep 5, 2024".
/// Unparseable dates are returned unchanged.
pub fn human_date(date: &str, today: NaiveDate) -> String {
    let Ok(day) = NaiveDate::parse_from_str(date, DATE_FORMAT) else {
        return date.to_string();
    };

    match (today - day).num_days() {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        n @ 2..=6 => format!("{} days ago", n),
        _ if day.year() == today.year() => day.format("%b %-d").to_string(),
        _ => day.format("%b %-d, %Y").to_string(),
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    value.as_deref().unwrap_or(default).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 10).unwrap()
    }

    #[test]
    fn test_human_date_relative() {
        assert_eq!(human_date("2025-09-10", today()), "Today");
        assert_eq!(human_date("2025-09-09", today()), "Yesterday");
        assert_eq!(human_date("2025-09-05", today()), "5 days ago");
    }

    #[test]
    fn test_human_date_absolute() {
        assert_eq!(human_date("2025-03-09", today()), "Mar 9");
        assert_eq!(human_date("2024-12-25", today()), "Dec 25, 2024");
        // Future dates are shown as dates, not negative ages
        assert_eq!(human_date("2025-09-12", today()), "Sep 12");
    }

    #[test]
    fn test_human_date_unparseable() {
        assert_eq!(human_date("someday", today()), "someday");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("—————", 4), "—...");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(&Some("DGH".to_string()), "-"), "DGH");
        assert_eq!(format_optional(&None, "-"), "-");
    }
}
