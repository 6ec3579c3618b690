// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Shared numeric, time, and formatting helpers.
//!
//! [`parse_seconds`] is the single place the malformed-aux-field policy is
//! enforced: a duration sample is accepted only if the field is a
//! non-negative integer literal, otherwise it is ignored without error.

use chrono::{DateTime, NaiveDate, Utc};

/// Parses an optional non-negative integer seconds field.
///
/// Returns `None` for empty strings, signs, decimals, or anything else that
/// is not a plain run of ASCII digits. Used uniformly by the correlator and
/// every aggregator so garbage aux fields are dropped in exactly one way.
pub fn parse_seconds(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse::<u64>().ok()
}

/// Rounds a rate or average to two decimal places for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `numerator / denominator * 100`, rounded, with 0.0 (never NaN) when the
/// denominator is zero.
pub fn percent(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round2(numerator as f64 / denominator as f64 * 100.0)
}

/// Renders an epoch-seconds timestamp as an ISO-8601 string (UTC, no
/// offset suffix), e.g. `2024-03-01T09:30:05`.
pub fn iso_timestamp(epoch: i64) -> String {
    match DateTime::<Utc>::from_timestamp(epoch, 0) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        None => epoch.to_string(),
    }
}

/// Hour of day (0-23, UTC) for an epoch-seconds timestamp.
pub fn hour_of(epoch: i64) -> u32 {
    use chrono::Timelike;
    DateTime::<Utc>::from_timestamp(epoch, 0).map_or(0, |dt| dt.hour())
}

/// Calendar date (UTC) for an epoch-seconds timestamp.
pub fn date_of(epoch: i64) -> NaiveDate {
    DateTime::<Utc>::from_timestamp(epoch, 0)
        .map_or_else(|| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default(), |dt| dt.date_naive())
}

/// Renders a duration as `<minutes>m <seconds>s`.
pub fn fmt_min_sec(seconds: u64) -> String {
    format!("{}m {}s", seconds / 60, seconds % 60)
}

/// Renders a duration as zero-padded `HH:MM:SS`.
pub fn fmt_hms(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds_accepts_digits_only() {
        assert_eq!(parse_seconds("0"), Some(0));
        assert_eq!(parse_seconds("42"), Some(42));
        assert_eq!(parse_seconds("000123"), Some(123));
    }

    #[test]
    fn test_parse_seconds_rejects_garbage() {
        assert_eq!(parse_seconds(""), None);
        assert_eq!(parse_seconds("abc"), None);
        assert_eq!(parse_seconds("-5"), None);
        assert_eq!(parse_seconds("+5"), None);
        assert_eq!(parse_seconds("5.0"), None);
        assert_eq!(parse_seconds(" 5"), None);
        // Larger than u64::MAX is still a digit run, but cannot be a sample.
        assert_eq!(parse_seconds("99999999999999999999999"), None);
    }

    #[test]
    fn test_percent_zero_denominator() {
        assert_eq!(percent(5, 0), 0.0);
        assert_eq!(percent(0, 0), 0.0);
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(1, 3), 33.33);
        assert_eq!(percent(2, 3), 66.67);
        assert_eq!(percent(3, 3), 100.0);
    }

    #[test]
    fn test_iso_timestamp() {
        assert_eq!(iso_timestamp(0), "1970-01-01T00:00:00");
        assert_eq!(iso_timestamp(1_700_000_000), "2023-11-14T22:13:20");
    }

    #[test]
    fn test_hour_and_date() {
        // 2023-11-14T22:13:20Z
        assert_eq!(hour_of(1_700_000_000), 22);
        assert_eq!(date_of(1_700_000_000).to_string(), "2023-11-14");
    }

    #[test]
    fn test_duration_formatting() {
        assert_eq!(fmt_min_sec(0), "0m 0s");
        assert_eq!(fmt_min_sec(65), "1m 5s");
        assert_eq!(fmt_hms(3725), "01:02:05");
        assert_eq!(fmt_hms(0), "00:00:00");
    }
}
