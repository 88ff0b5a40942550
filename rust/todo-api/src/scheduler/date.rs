//! Calendar date helpers for the fixed-width `YYYYMMDD` storage format.
//!
//! Stored dates are compared as strings elsewhere in the service, which only
//! works because the format is fixed-width and zero-padded. Everything that
//! produces a stored date goes through [`format_date`].

use chrono::{Local, NaiveDate};

/// Storage and wire format for task dates.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Format accepted by the task search box.
pub const SEARCH_DATE_FORMAT: &str = "%d.%m.%Y";

/// Parse an 8-digit `YYYYMMDD` date.
///
/// chrono's `%Y` accepts signs and variable widths, so the shape is checked
/// first: anything other than exactly eight ASCII digits is rejected.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Format a date as `YYYYMMDD`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `DD.MM.YYYY` search string.
pub fn parse_search_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[2] != b'.' || bytes[5] != b'.' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit());
    if !digits_ok {
        return None;
    }
    NaiveDate::parse_from_str(value, SEARCH_DATE_FORMAT).ok()
}

/// Current date in the process-local time zone.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
