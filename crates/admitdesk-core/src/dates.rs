//! Exam date formatting.
//!
//! Settings store dates exactly as the admin form submits them (usually
//! `YYYY-MM-DD`, occasionally a full RFC 3339 timestamp). Everything printed
//! for candidates uses `DD/MM/YYYY`.

use chrono::{DateTime, NaiveDate};

/// Placeholder printed when no exam date has been configured.
pub const NOT_SET: &str = "Not Set";

/// Parses a form or settings date: exactly `YYYY-MM-DD`, or an RFC 3339
/// timestamp reduced to its calendar date. Anything else is `None`.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.date_naive()))
}

/// Formats a stored date string as `DD/MM/YYYY`.
///
/// Empty or missing input yields [`NOT_SET`]. Input that is not a recognised
/// date is returned unchanged so a hand-typed value still reaches the card.
pub fn format_ddmmyyyy(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty() && *s != NOT_SET) else {
        return NOT_SET.to_string();
    };

    match parse_iso_date(raw) {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => raw.to_string(),
    }
}
