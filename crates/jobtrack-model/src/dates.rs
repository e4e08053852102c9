//! Applied-date parsing.
//!
//! Export providers disagree on date layout. Slash-separated dates are read
//! month-first; dotted dates day-first.

use chrono::NaiveDate;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    // Before any %Y layout, which would read "24" as the year 24.
    "%m/%d/%y",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Parses a date, ignoring any time-of-day suffix on ISO timestamps.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
    {
        return Some(date);
    }
    // 2024-01-05T10:00:00Z, 2024-01-05 10:00
    let prefix = trimmed.get(..10)?;
    let rest = &trimmed[10..];
    if rest.starts_with('T') || rest.starts_with(' ') {
        return NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok();
    }
    None
}

/// ISO `YYYY-MM-DD` rendering of a parseable date.
pub fn normalize_date(raw: &str) -> Option<String> {
    parse_date(raw).map(|date| date.format("%Y-%m-%d").to_string())
}

/// Absolute distance in whole days.
pub fn days_apart(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days().abs()
}
