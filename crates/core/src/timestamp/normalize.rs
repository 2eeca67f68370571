//! Conversions between canonical timestamps and every other representation.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use serde_json::{Number, Value as JsonValue};

use super::{CanonicalTimestamp, TemporalValue, TimestampError};

/// Fallback shown by [`to_display_string`] when there is nothing to show.
pub const NOT_SET: &str = "Not set";

/// Hour (local) a bare date is moved to when it parses to midnight.
pub const DEFAULT_BUSINESS_HOUR: u32 = 9;

/// Day, abbreviated month and year, e.g. `01 Mar 2024`.
pub const DISPLAY_DATE: &str = "%d %b %Y";
/// Date with a 24-hour time, e.g. `01 Mar 2024, 14:30`.
pub const DISPLAY_DATE_TIME: &str = "%d %b %Y, %H:%M";
/// 24-hour time only.
pub const DISPLAY_TIME: &str = "%H:%M";
/// Value format of an HTML `datetime-local` input.
pub const INPUT_DATE_TIME: &str = "%Y-%m-%dT%H:%M";
/// Value format of an HTML `date` input.
pub const INPUT_DATE: &str = "%Y-%m-%d";

/// Date-time formats tried (in order) for strings without an offset.
const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %I:%M %p",
    "%d %b %Y, %H:%M",
    "%d %b %Y %H:%M",
    "%d %B %Y %H:%M",
    "%B %d, %Y %H:%M",
    "%B %d, %Y %I:%M %p",
    "%b %d, %Y, %I:%M %p",
];

/// Date-only formats tried (in order) after the date-time formats.
const NAIVE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Structural check for a `{seconds, nanoseconds}` object.
///
/// Returns true only if `value` is a JSON object whose `seconds` and
/// `nanoseconds` fields are both numbers. Range is not checked here; use
/// [`to_canonical`] for that.
///
/// ```
/// use onboarding_core::timestamp::is_canonical;
/// use serde_json::json;
///
/// assert!(is_canonical(&json!({"seconds": 1, "nanoseconds": 0})));
/// assert!(!is_canonical(&json!({"seconds": "1", "nanoseconds": 0})));
/// assert!(!is_canonical(&json!(null)));
/// ```
#[must_use]
pub fn is_canonical(value: &JsonValue) -> bool {
    let is_number = |field: &str| {
        value
            .get(field)
            .and_then(JsonValue::as_f64)
            .is_some_and(|n| !n.is_nan())
    };
    value.is_object() && is_number("seconds") && is_number("nanoseconds")
}

/// Strictly convert a native date, canonical value or canonical-shaped JSON.
///
/// # Errors
///
/// - [`TimestampError::InvalidFormat`] for strings, missing values and JSON
///   that is not `{seconds, nanoseconds}`-shaped.
/// - [`TimestampError::OutOfRange`] when the shape matches but the values
///   break the canonical invariants.
pub fn to_canonical(value: impl Into<TemporalValue>) -> Result<CanonicalTimestamp, TimestampError> {
    match value.into() {
        TemporalValue::Canonical(ts) => Ok(ts),
        TemporalValue::Native(dt) => CanonicalTimestamp::from_datetime(&dt),
        TemporalValue::Unknown(json) if is_canonical(&json) => canonical_from_json(&json),
        TemporalValue::Unknown(json) => Err(TimestampError::InvalidFormat(json.to_string())),
        TemporalValue::Text(text) => Err(TimestampError::InvalidFormat(format!("string {text:?}"))),
        TemporalValue::Missing => Err(TimestampError::InvalidFormat("missing value".to_string())),
    }
}

/// Build a canonical timestamp from a JSON object that passed [`is_canonical`].
pub(super) fn canonical_from_json(value: &JsonValue) -> Result<CanonicalTimestamp, TimestampError> {
    let field = |name: &str| value.get(name).and_then(JsonValue::as_number);
    let (Some(seconds), Some(nanoseconds)) = (field("seconds"), field("nanoseconds")) else {
        return Err(TimestampError::InvalidFormat(value.to_string()));
    };

    let out_of_range = || TimestampError::OutOfRange {
        seconds: whole_number(seconds).unwrap_or(-1),
        nanoseconds: whole_number(nanoseconds).unwrap_or(-1),
    };

    let seconds_whole = whole_number(seconds).ok_or_else(out_of_range)?;
    let nanos_whole = whole_number(nanoseconds)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(out_of_range)?;

    CanonicalTimestamp::new(seconds_whole, nanos_whole)
}

/// Integral value of a JSON number; `None` for fractions and huge values.
#[allow(clippy::cast_possible_truncation)] // guarded by the range check
fn whole_number(n: &Number) -> Option<i64> {
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e18)
            .map(|f| f as i64)
    })
}

/// Leniently parse any supported representation.
///
/// - missing or unrecognised values yield `None`
/// - canonical values pass through unchanged
/// - native dates are converted (pre-epoch yields `None`)
/// - strings are parsed in local time unless they carry an offset
///
/// A string that lands on exactly 00:00:00 local time is moved to 09:00 local
/// the same day: a bare date means "during business hours", not midnight.
///
/// ```
/// use chrono::Timelike;
/// use onboarding_core::timestamp::parse_flexible;
///
/// let ts = parse_flexible("2024-03-01").unwrap();
/// assert_eq!(ts.to_local().hour(), 9);
/// assert!(parse_flexible("not-a-date").is_none());
/// ```
#[must_use]
pub fn parse_flexible(value: impl Into<TemporalValue>) -> Option<CanonicalTimestamp> {
    match value.into() {
        TemporalValue::Canonical(ts) => Some(ts),
        TemporalValue::Native(dt) => CanonicalTimestamp::from_datetime(&dt).ok(),
        TemporalValue::Text(text) => parse_text(&text),
        TemporalValue::Missing | TemporalValue::Unknown(_) => None,
    }
}

fn parse_text(text: &str) -> Option<CanonicalTimestamp> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let parsed = parse_with_offset(text).or_else(|| parse_naive(text))?;
    let adjusted = apply_business_hours_default(parsed)?;
    CanonicalTimestamp::from_datetime(&adjusted).ok()
}

fn parse_with_offset(text: &str) -> Option<DateTime<Local>> {
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_rfc2822(text))
        .ok()
        .map(|dt| dt.with_timezone(&Local))
}

fn parse_naive(text: &str) -> Option<DateTime<Local>> {
    let naive = NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NAIVE_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .map(|date| date.and_time(chrono::NaiveTime::MIN))
        })?;

    Local.from_local_datetime(&naive).earliest()
}

fn apply_business_hours_default(dt: DateTime<Local>) -> Option<DateTime<Local>> {
    if dt.hour() != 0 || dt.minute() != 0 || dt.second() != 0 {
        return Some(dt);
    }

    let nine = dt
        .date_naive()
        .and_hms_opt(DEFAULT_BUSINESS_HOUR, 0, 0)?;
    Local.from_local_datetime(&nine).earliest()
}

/// Format any supported representation with a `strftime` pattern, falling
/// back to [`NOT_SET`].
#[must_use]
pub fn to_display_string(value: impl Into<TemporalValue>, pattern: &str) -> String {
    to_display_string_or(value, pattern, NOT_SET)
}

/// Format any supported representation with a `strftime` pattern.
///
/// Formatting happens in local time. Missing or unparseable values, and
/// patterns chrono cannot interpret, all produce `fallback`.
///
/// ```
/// use onboarding_core::timestamp::{DISPLAY_DATE, to_display_string_or};
///
/// assert_eq!(to_display_string_or("not-a-date", DISPLAY_DATE, "Not set"), "Not set");
/// assert_eq!(to_display_string_or("2024-03-01", DISPLAY_DATE, "-"), "01 Mar 2024");
/// ```
#[must_use]
pub fn to_display_string_or(
    value: impl Into<TemporalValue>,
    pattern: &str,
    fallback: &str,
) -> String {
    parse_flexible(value)
        .and_then(|ts| format_local(ts, pattern))
        .unwrap_or_else(|| fallback.to_owned())
}

/// Value for an HTML `datetime-local` input, or an empty string.
#[must_use]
pub fn to_input_string(value: impl Into<TemporalValue>) -> String {
    to_display_string_or(value, INPUT_DATE_TIME, "")
}

/// Value for an HTML `date` input, or an empty string.
#[must_use]
pub fn to_date_input_string(value: impl Into<TemporalValue>) -> String {
    to_display_string_or(value, INPUT_DATE, "")
}

/// Returns true if both values parse and fall on the same local calendar day.
#[must_use]
pub fn is_same_calendar_day(a: impl Into<TemporalValue>, b: impl Into<TemporalValue>) -> bool {
    match (parse_flexible(a), parse_flexible(b)) {
        (Some(a), Some(b)) => a.to_local().date_naive() == b.to_local().date_naive(),
        _ => false,
    }
}

fn format_local(ts: CanonicalTimestamp, pattern: &str) -> Option<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }

    let mut out = String::new();
    write!(out, "{}", ts.to_local().format_with_items(items.iter())).ok()?;
    Some(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Datelike, Utc};
    use serde_json::json;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, min, 0).earliest().unwrap()
    }

    // --- is_canonical / to_canonical ---

    #[test]
    fn test_is_canonical_shapes() {
        assert!(is_canonical(&json!({"seconds": 0, "nanoseconds": 0})));
        assert!(is_canonical(&json!({"seconds": 1.5, "nanoseconds": 0, "extra": true})));
        assert!(!is_canonical(&json!({"seconds": 1})));
        assert!(!is_canonical(&json!({"seconds": null, "nanoseconds": 0})));
        assert!(!is_canonical(&json!([1, 0])));
        assert!(!is_canonical(&json!("2024-03-01")));
    }

    #[test]
    fn test_to_canonical_accepts_native_and_shaped_values() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(to_canonical(dt).unwrap().seconds(), dt.timestamp());

        let ts = to_canonical(json!({"seconds": 100, "nanoseconds": 5})).unwrap();
        assert_eq!((ts.seconds(), ts.nanoseconds()), (100, 5));

        let passthrough = CanonicalTimestamp::new(7, 0).unwrap();
        assert_eq!(to_canonical(passthrough).unwrap(), passthrough);
    }

    #[test]
    fn test_to_canonical_rejects_other_shapes() {
        assert!(matches!(
            to_canonical("2024-03-01"),
            Err(TimestampError::InvalidFormat(_))
        ));
        assert!(matches!(
            to_canonical(json!({"secs": 1})),
            Err(TimestampError::InvalidFormat(_))
        ));
        assert!(matches!(
            to_canonical(TemporalValue::Missing),
            Err(TimestampError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_to_canonical_out_of_range() {
        assert!(matches!(
            to_canonical(json!({"seconds": -1, "nanoseconds": 0})),
            Err(TimestampError::OutOfRange { .. })
        ));
        assert!(matches!(
            to_canonical(json!({"seconds": 1.25, "nanoseconds": 0})),
            Err(TimestampError::OutOfRange { .. })
        ));
        assert!(matches!(
            to_canonical(json!({"seconds": 1, "nanoseconds": 1_000_000_000})),
            Err(TimestampError::OutOfRange { .. })
        ));
    }

    // --- parse_flexible ---

    #[test]
    fn test_parse_flexible_missing_and_garbage() {
        assert!(parse_flexible(TemporalValue::Missing).is_none());
        assert!(parse_flexible(None::<&str>).is_none());
        assert!(parse_flexible("").is_none());
        assert!(parse_flexible("   ").is_none());
        assert!(parse_flexible("not-a-date").is_none());
        assert!(parse_flexible("2024-13-45").is_none());
        assert!(parse_flexible(json!(true)).is_none());
    }

    #[test]
    fn test_parse_flexible_canonical_passthrough() {
        let ts = CanonicalTimestamp::new(1_709_283_600, 42).unwrap();
        assert_eq!(parse_flexible(ts), Some(ts));
        assert_eq!(
            parse_flexible(json!({"seconds": 1_709_283_600, "nanoseconds": 42})),
            Some(ts)
        );
    }

    #[test]
    fn test_parse_flexible_native_date() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        // Native dates are taken as-is; the business-hours rule applies to strings.
        assert_eq!(parse_flexible(dt).unwrap().to_utc(), dt);

        let before_epoch = Utc.with_ymd_and_hms(1969, 12, 31, 0, 0, 0).unwrap();
        assert!(parse_flexible(before_epoch).is_none());
    }

    #[test]
    fn test_bare_date_defaults_to_nine_am_local() {
        let ts = parse_flexible("2024-03-01").unwrap();
        let local = ts.to_local();
        assert_eq!(
            (local.year(), local.month(), local.day()),
            (2024, 3, 1)
        );
        assert_eq!((local.hour(), local.minute(), local.second()), (9, 0, 0));
    }

    #[test]
    fn test_explicit_midnight_string_also_moves_to_nine() {
        let ts = parse_flexible("2024-03-01T00:00").unwrap();
        assert_eq!(ts.to_local().hour(), DEFAULT_BUSINESS_HOUR);
    }

    #[test]
    fn test_non_midnight_time_is_kept() {
        let ts = parse_flexible("2024-03-01T00:30").unwrap();
        let local = ts.to_local();
        assert_eq!((local.hour(), local.minute()), (0, 30));

        let ts = parse_flexible("2024-03-01 14:45:10").unwrap();
        let local = ts.to_local();
        assert_eq!((local.hour(), local.minute(), local.second()), (14, 45, 10));
    }

    #[test]
    fn test_parse_flexible_with_offset() {
        let ts = parse_flexible("2024-03-01T10:15:30.250Z").unwrap();
        assert_eq!(
            ts.to_utc(),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 30).unwrap()
                + chrono::Duration::milliseconds(250)
        );

        let ts = parse_flexible("Fri, 01 Mar 2024 10:15:30 +0000").unwrap();
        assert_eq!(ts.seconds(), 1_709_288_130);
    }

    #[test]
    fn test_parse_flexible_locale_formats() {
        let expected = local(2024, 3, 1, 14, 30).date_naive();
        for text in [
            "01/03/2024 14:30",
            "1 March 2024 14:30",
            "March 1, 2024 2:30 PM",
            "01 Mar 2024, 14:30",
        ] {
            let ts = parse_flexible(text).unwrap_or_else(|| panic!("failed to parse {text}"));
            assert_eq!(ts.to_local().date_naive(), expected, "{text}");
            assert_eq!(ts.to_local().hour(), 14, "{text}");
        }

        for text in ["01/03/2024", "1 March 2024", "March 1, 2024", "2024/03/01"] {
            let ts = parse_flexible(text).unwrap_or_else(|| panic!("failed to parse {text}"));
            assert_eq!(ts.to_local().date_naive(), expected, "{text}");
            assert_eq!(ts.to_local().hour(), 9, "{text}");
        }
    }

    // --- display / input ---

    #[test]
    fn test_display_fallbacks() {
        assert_eq!(to_display_string("not-a-date", DISPLAY_DATE), NOT_SET);
        assert_eq!(
            to_display_string_or("not-a-date", DISPLAY_DATE, "Not set"),
            "Not set"
        );
        assert_eq!(to_display_string_or(None::<String>, DISPLAY_DATE, "-"), "-");
        assert_eq!(to_display_string_or(json!([1, 2]), DISPLAY_DATE, "?"), "?");
    }

    #[test]
    fn test_display_with_invalid_pattern_falls_back() {
        let ts = CanonicalTimestamp::now();
        assert_eq!(to_display_string_or(ts, "%Q %!", "fallback"), "fallback");
    }

    #[test]
    fn test_display_formats_in_local_time() {
        let dt = local(2024, 3, 1, 14, 30);
        assert_eq!(to_display_string(dt, DISPLAY_DATE_TIME), "01 Mar 2024, 14:30");
        assert_eq!(to_display_string(dt, DISPLAY_TIME), "14:30");
        assert_eq!(to_display_string(dt, DISPLAY_DATE), "01 Mar 2024");
    }

    #[test]
    fn test_input_strings() {
        let dt = local(2024, 3, 1, 14, 30);
        assert_eq!(to_input_string(dt), "2024-03-01T14:30");
        assert_eq!(to_date_input_string(dt), "2024-03-01");
        assert_eq!(to_input_string("garbage"), "");
        assert_eq!(to_date_input_string(TemporalValue::Missing), "");
    }

    #[test]
    fn test_display_and_input_strings_round_trip() {
        let original = local(2024, 7, 15, 16, 5);
        let canonical = CanonicalTimestamp::from_datetime(&original).unwrap();

        let from_display = parse_flexible(to_display_string(canonical, DISPLAY_DATE_TIME)).unwrap();
        assert_eq!(from_display.to_local(), original);

        let from_input = parse_flexible(to_input_string(canonical)).unwrap();
        assert_eq!(from_input.to_local(), original);
    }

    // --- is_same_calendar_day ---

    #[test]
    fn test_same_calendar_day() {
        assert!(is_same_calendar_day("2024-03-01", "2024-03-01"));
        assert!(is_same_calendar_day(
            "2024-03-01T08:00",
            local(2024, 3, 1, 23, 59)
        ));
        assert!(!is_same_calendar_day("2024-03-01", "2024-03-02"));
    }

    #[test]
    fn test_same_calendar_day_with_unparseable_side() {
        assert!(!is_same_calendar_day(TemporalValue::Missing, "2024-03-01"));
        assert!(!is_same_calendar_day("2024-03-01", "garbage"));
        assert!(!is_same_calendar_day(
            TemporalValue::Missing,
            TemporalValue::Missing
        ));
    }
}
