//! Lenient parsing of spreadsheet cell text into amounts and dates.
//!
//! Nothing here fails: a value that cannot be read is `None`, and callers
//! decide whether that means zero, a skipped row, or a counted warning.

use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Largest magnitude read as an amount: 1e20. Sums of up to a few hundred
/// million such values stay inside `Decimal`'s range.
fn max_amount() -> Decimal {
    Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0)
}

/// Parse a monetary amount as exported by accounting tools.
///
/// Accepts `1234.5`, `$1,234.50`, `(12.00)` (negative), `-3`, `1e3`.
/// Magnitudes above 1e20 are rejected.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let (negative, inner) = match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, text),
    };

    let sanitized: String = inner
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if sanitized.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&sanitized)
        .or_else(|_| Decimal::from_scientific(&sanitized))
        .ok()?;
    if value.abs() > max_amount() {
        return None;
    }

    Some(if negative { -value } else { value })
}

/// Amount or zero. The flag reports whether a non-empty cell was discarded.
pub fn amount_or_zero(text: &str) -> (Decimal, bool) {
    match parse_amount(text) {
        Some(value) => (value, false),
        None => (Decimal::ZERO, !text.trim().is_empty()),
    }
}

/// Excel's day zero for the 1900 date system (accounts for the 1900 leap bug).
fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

/// Parse a date that may be an Excel serial number or a formatted string.
pub fn parse_excelish_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if is_serial(text) {
        let serial: f64 = text.parse().ok()?;
        if !serial.is_finite() || serial.abs() > 2_958_465.0 {
            return None;
        }
        return excel_epoch().checked_add_signed(Duration::days(serial.floor() as i64));
    }

    for fmt in ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return Some(d);
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive())
}

/// `[+-]?digits(.digits)?`
fn is_serial(text: &str) -> bool {
    let body = text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text);
    let (int, frac) = match body.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (body, None),
    };
    !int.is_empty()
        && int.bytes().all(|b| b.is_ascii_digit())
        && frac.map_or(true, |f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()))
}
