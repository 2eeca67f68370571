//! Canonical timestamps and the timestamp normalizer.
//!
//! Every instant persisted by the onboarding system is stored as a
//! [`CanonicalTimestamp`]: whole seconds since the Unix epoch plus a
//! sub-second nanosecond component. Everything else (native `DateTime`s,
//! ISO strings, locale-formatted strings, raw JSON from older clients) only
//! exists at input/output boundaries and is funnelled through
//! [`TemporalValue`].
//!
//! # Strict vs lenient entry points
//!
//! [`to_canonical`] is the only operation that returns an error. Callers that
//! have already validated a value's shape (e.g. with [`is_canonical`]) use it
//! to fail fast. Everything else ([`parse_flexible`], [`to_display_string`],
//! [`to_input_string`], [`is_same_calendar_day`]) is total and degrades to a
//! documented fallback.
//!
//! # Default business-hours time
//!
//! A string that parses to exactly local midnight is moved to 09:00 local on
//! the same day. Bare dates entered in forms ("2024-03-01") therefore land on
//! the start of the business day rather than at 00:00.

mod normalize;
mod value;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub use normalize::{
    DEFAULT_BUSINESS_HOUR, DISPLAY_DATE, DISPLAY_DATE_TIME, DISPLAY_TIME, INPUT_DATE,
    INPUT_DATE_TIME, NOT_SET, is_canonical, is_same_calendar_day, parse_flexible, to_canonical,
    to_date_input_string, to_display_string, to_display_string_or, to_input_string,
};
pub use value::TemporalValue;

/// Upper bound (exclusive) for the nanosecond component.
pub const NANOS_PER_SECOND: i32 = 1_000_000_000;

/// Errors raised by the strict timestamp entry points.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    /// The value is not a native date and not `{seconds, nanoseconds}`-shaped.
    #[error("invalid timestamp format: {0}")]
    InvalidFormat(String),

    /// The value has the right shape but violates the canonical invariant.
    #[error("timestamp out of range: seconds={seconds}, nanoseconds={nanoseconds}")]
    OutOfRange {
        /// Whole seconds as supplied.
        seconds: i64,
        /// Sub-second component as supplied.
        nanoseconds: i64,
    },
}

/// An instant in time as `(seconds, nanoseconds)` since the Unix epoch.
///
/// ## Invariants
///
/// - `seconds >= 0`
/// - `0 <= nanoseconds < 1_000_000_000`
/// - `seconds` is representable as a `chrono::DateTime<Utc>`
///
/// Deserialization enforces the invariants, so a `CanonicalTimestamp` read
/// from the wire is always valid.
///
/// ```
/// use onboarding_core::CanonicalTimestamp;
///
/// let ts = CanonicalTimestamp::new(1_709_283_600, 0).unwrap();
/// assert_eq!(ts.seconds(), 1_709_283_600);
/// assert!(CanonicalTimestamp::new(-1, 0).is_err());
/// assert!(CanonicalTimestamp::new(0, 1_000_000_000).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimestamp")]
pub struct CanonicalTimestamp {
    seconds: i64,
    nanoseconds: i32,
}

/// Unvalidated wire shape used by `Deserialize`.
#[derive(Deserialize)]
struct RawTimestamp {
    seconds: i64,
    nanoseconds: i64,
}

impl TryFrom<RawTimestamp> for CanonicalTimestamp {
    type Error = TimestampError;

    fn try_from(raw: RawTimestamp) -> Result<Self, Self::Error> {
        let out_of_range = || TimestampError::OutOfRange {
            seconds: raw.seconds,
            nanoseconds: raw.nanoseconds,
        };
        let nanoseconds = i32::try_from(raw.nanoseconds).map_err(|_| out_of_range())?;
        Self::new(raw.seconds, nanoseconds)
    }
}

impl CanonicalTimestamp {
    /// The Unix epoch.
    pub const EPOCH: Self = Self {
        seconds: 0,
        nanoseconds: 0,
    };

    /// Create a timestamp, validating the canonical invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError::OutOfRange`] if either component is negative,
    /// `nanoseconds` is not below one billion, or `seconds` lies beyond the
    /// range chrono can represent.
    pub fn new(seconds: i64, nanoseconds: i32) -> Result<Self, TimestampError> {
        let valid = seconds >= 0
            && (0..NANOS_PER_SECOND).contains(&nanoseconds)
            && DateTime::<Utc>::from_timestamp(seconds, nanoseconds.unsigned_abs()).is_some();

        if valid {
            Ok(Self {
                seconds,
                nanoseconds,
            })
        } else {
            Err(TimestampError::OutOfRange {
                seconds,
                nanoseconds: i64::from(nanoseconds),
            })
        }
    }

    /// Convert any chrono `DateTime` into a canonical timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError::OutOfRange`] for instants before the epoch.
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Result<Self, TimestampError> {
        let nanoseconds = i32::try_from(dt.timestamp_subsec_nanos()).map_err(|_| {
            TimestampError::OutOfRange {
                seconds: dt.timestamp(),
                nanoseconds: i64::from(dt.timestamp_subsec_nanos()),
            }
        })?;
        Self::new(dt.timestamp(), nanoseconds)
    }

    /// The current instant.
    #[must_use]
    pub fn now() -> Self {
        // The system clock is after 1970 on every host we run on.
        Self::from_datetime(&Utc::now()).unwrap_or(Self::EPOCH)
    }

    /// Whole seconds since the Unix epoch.
    #[must_use]
    pub const fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Sub-second component in nanoseconds.
    #[must_use]
    pub const fn nanoseconds(&self) -> i32 {
        self.nanoseconds
    }

    /// This instant as a UTC `DateTime`.
    #[must_use]
    pub fn to_utc(&self) -> DateTime<Utc> {
        // `new` rejects anything chrono cannot represent.
        DateTime::<Utc>::from_timestamp(self.seconds, self.nanoseconds.unsigned_abs())
            .unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// This instant in the host's local time zone.
    #[must_use]
    pub fn to_local(&self) -> DateTime<Local> {
        self.to_utc().with_timezone(&Local)
    }
}

impl std::fmt::Display for CanonicalTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_utc().to_rfc3339())
    }
}

/// Types that can convert themselves into a [`CanonicalTimestamp`].
///
/// This is the seam for "database-native" temporal values: anything that
/// knows how to express itself as an instant implements it, and
/// [`to_canonical`] accepts it via [`TemporalValue`].
pub trait ToCanonical {
    /// Convert into the canonical representation.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError`] if the value cannot be represented.
    fn to_canonical(&self) -> Result<CanonicalTimestamp, TimestampError>;
}

impl ToCanonical for CanonicalTimestamp {
    fn to_canonical(&self) -> Result<CanonicalTimestamp, TimestampError> {
        Ok(*self)
    }
}

impl<Tz: TimeZone> ToCanonical for DateTime<Tz> {
    fn to_canonical(&self) -> Result<CanonicalTimestamp, TimestampError> {
        CanonicalTimestamp::from_datetime(self)
    }
}
