//! Time and date parsing utilities.
//!
//! All timestamps are carried at second precision: the store persists
//! RFC3339 without sub-second components, so parsed and synthesized values
//! are truncated before use.

use crate::error::{Result, TrackerError, ValidationError, ViolationKind};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SubsecRound, TimeZone, Utc};

/// Current time truncated to whole seconds.
#[must_use]
pub fn now_second() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Truncate a timestamp to whole seconds.
#[must_use]
pub fn to_second(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(0)
}

/// Parse a flexible time specification into a `DateTime<Utc>`.
///
/// Supports:
/// - RFC3339: `2021-09-01T12:00:00Z`, `2021-09-01T12:00:00+00:00`
/// - Space-separated: `2021-09-01 12:00:00` (UTC)
/// - Simple date: `2021-09-01` (midnight UTC)
/// - Relative duration: `+1h`, `+2d`, `-30m`
///
/// The result is truncated to whole seconds.
///
/// # Errors
///
/// Returns a validation error if the format is unrecognized or a relative
/// duration has an invalid unit (only m, h, d, w supported).
pub fn parse_flexible_timestamp(s: &str, field_name: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    // Try RFC3339 first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(to_second(dt.with_timezone(&Utc)));
    }

    // Space-separated datetime, interpreted as UTC
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    // Simple date (YYYY-MM-DD) - midnight UTC
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        return Ok(Utc.from_utc_datetime(&naive));
    }

    // Relative duration (+1h, +2d, -30m)
    if let Some(dt) = parse_relative_time(s) {
        return Ok(dt);
    }

    Err(TrackerError::Validation(ValidationError::new(
        ViolationKind::ConstraintViolation,
        field_name,
        "invalid time format (try: 2021-09-01T12:00:00Z, 2021-09-01 12:00:00, 2021-09-01, or +1h)",
    )))
}

/// Parse a relative time expression into a `DateTime<Utc>`.
///
/// Supports `+1h`, `+2d`, `+1w`, `+30m`, `-7d`. Returns `None` if the input
/// cannot be parsed as a relative time.
#[must_use]
pub fn parse_relative_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    let rest = s.strip_prefix(['+', '-'].as_ref())?;
    let is_negative = s.starts_with('-');
    let unit_char = rest.chars().last()?;
    let amount_str = &rest[..rest.len() - 1];
    let amount: i64 = amount_str.parse().ok()?;
    let amount = if is_negative { -amount } else { amount };

    let duration = match unit_char {
        'm' => Duration::minutes(amount),
        'h' => Duration::hours(amount),
        'd' => Duration::days(amount),
        'w' => Duration::weeks(amount),
        _ => return None,
    };

    Some(now_second() + duration)
}
