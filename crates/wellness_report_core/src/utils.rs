//! Date normalization and small numeric helpers.

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Parse a record date from the shapes stores commonly emit.
///
/// Accepts:
/// - YYYY-MM-DD
/// - RFC3339 datetime (date part in its own offset)
/// - Naive datetime YYYY-MM-DDTHH:MM:SS, with or without fractional seconds
pub fn parse_record_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ndt.date());
    }
    None
}

/// First day of a trailing window of `days` days ending on `today` (inclusive).
pub fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    let span = i64::from(days.max(1)) - 1;
    today
        .checked_sub_signed(Duration::days(span))
        .unwrap_or(NaiveDate::MIN)
}

/// Dates `today`, `today - 1`, ... for `days` days, most recent first.
pub fn trailing_days(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..i64::from(days))
        .filter_map(|offset| today.checked_sub_signed(Duration::days(offset)))
        .collect()
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Human-readable name used for report index entries.
pub fn display_name_for(created_at: DateTime<Utc>) -> String {
    format!("Health Report {}", created_at.format("%Y-%m-%d %H:%M"))
}
