//! The sum type over every temporal shape accepted at a boundary.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

use super::{CanonicalTimestamp, normalize::is_canonical, normalize::canonical_from_json};

/// A temporal value in whatever shape a caller handed us.
///
/// Forms, JSON payloads, imports and database rows all deliver instants in
/// different shapes. Converting into `TemporalValue` once at the boundary
/// replaces ad-hoc type sniffing at every call site; the normalizer functions
/// accept anything that is `Into<TemporalValue>`.
///
/// | Input | Variant |
/// |-------|---------|
/// | `None`, JSON `null` | `Missing` |
/// | [`CanonicalTimestamp`], valid `{seconds, nanoseconds}` JSON | `Canonical` |
/// | any `chrono::DateTime<Tz>` | `Native` |
/// | `&str`, `String`, JSON string | `Text` |
/// | anything else | `Unknown` |
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TemporalValue {
    /// No value supplied.
    #[default]
    Missing,
    /// Already canonical.
    Canonical(CanonicalTimestamp),
    /// A native date object.
    Native(DateTime<Utc>),
    /// A string in ISO, RFC or locale format.
    Text(String),
    /// Some other JSON shape; kept for strict validation errors.
    Unknown(JsonValue),
}

impl TemporalValue {
    /// Returns true if no value was supplied (or the text is blank).
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<CanonicalTimestamp> for TemporalValue {
    fn from(ts: CanonicalTimestamp) -> Self {
        Self::Canonical(ts)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for TemporalValue {
    fn from(dt: DateTime<Tz>) -> Self {
        Self::Native(dt.with_timezone(&Utc))
    }
}

impl From<&str> for TemporalValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for TemporalValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for TemporalValue {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<&Self> for TemporalValue {
    fn from(value: &Self) -> Self {
        value.clone()
    }
}

impl<T: Into<Self>> From<Option<T>> for TemporalValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

impl From<JsonValue> for TemporalValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Missing,
            JsonValue::String(text) => Self::Text(text),
            other if is_canonical(&other) => match canonical_from_json(&other) {
                Ok(ts) => Self::Canonical(ts),
                Err(_) => Self::Unknown(other),
            },
            other => Self::Unknown(other),
        }
    }
}

impl From<&JsonValue> for TemporalValue {
    fn from(value: &JsonValue) -> Self {
        Self::from(value.clone())
    }
}

impl<'de> Deserialize<'de> for TemporalValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        JsonValue::deserialize(deserializer).map(Self::from)
    }
}
