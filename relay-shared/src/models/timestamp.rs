use std::borrow::Cow;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parses a server timestamp.
///
/// Accepts RFC 3339 values (`2025-06-01T10:15:30Z`) and zone-less local
/// date-times (`2025-06-01T10:15:30.123456`), which are read as UTC.
/// Fractional seconds beyond millisecond precision are dropped first.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let sanitized = truncate_fraction(raw.trim());

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&sanitized) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(&sanitized, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Formats a server timestamp relative to `now`.
///
/// Produces `just now`, `5m ago`, `3h ago`, `2d ago`, or the calendar date
/// once a week has passed. Values that cannot be parsed are returned as-is.
pub fn format_relative(raw: &str, now: DateTime<Utc>) -> String {
    let Some(moment) = parse_timestamp(raw) else {
        return raw.to_string();
    };

    let minutes = (now - moment).num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }

    let days = hours / 24;
    if days < 7 {
        return format!("{days}d ago");
    }

    moment.format("%Y-%m-%d").to_string()
}

fn truncate_fraction(raw: &str) -> Cow<'_, str> {
    let Some(dot) = raw.find('.') else {
        return Cow::Borrowed(raw);
    };

    let fraction = &raw[dot + 1..];
    let digits = fraction.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits <= 3 {
        return Cow::Borrowed(raw);
    }

    Cow::Owned(format!("{}{}", &raw[..dot + 4], &fraction[digits..]))
}
