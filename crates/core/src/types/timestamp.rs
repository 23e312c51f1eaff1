//! Backend timestamp type.

use core::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`Timestamp`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// The input string is empty.
    #[error("timestamp cannot be empty")]
    Empty,
    /// The input matches none of the accepted formats.
    #[error("unrecognized timestamp: {0}")]
    Unrecognized(String),
}

/// Offset-less layouts the backend emits for columns without a time zone.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// A point in time reported by the backend.
///
/// The backend serializes `created_at` either as RFC 3339 (with offset) or as
/// a naive ISO 8601 timestamp. Naive values are interpreted as UTC.
///
/// ## Examples
///
/// ```
/// use shopkeeper_core::Timestamp;
///
/// assert!(Timestamp::parse("2025-03-01T12:30:00+00:00").is_ok());
/// assert!(Timestamp::parse("2025-03-01T12:30:00.123456").is_ok());
/// assert!(Timestamp::parse("yesterday").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Parse a backend timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or matches no accepted format.
    pub fn parse(s: &str) -> Result<Self, TimestampError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TimestampError::Empty);
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(dt.with_timezone(&Utc)));
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(|naive| Self(naive.and_utc()))
            .ok_or_else(|| TimestampError::Unrecognized(s.to_owned()))
    }

    /// Returns the wrapped UTC datetime.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Short human-readable form used in list views (`2025-03-01 12:30`).
    #[must_use]
    pub fn display_short(&self) -> String {
        self.0.format("%Y-%m-%d %H:%M").to_string()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl std::str::FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn test_parse_rfc3339_converts_offset() {
        let ts = Timestamp::parse("2025-03-01T12:30:00+02:00").unwrap();
        assert_eq!(ts.as_datetime().hour(), 10);
    }

    #[test]
    fn test_parse_naive_is_utc() {
        let ts = Timestamp::parse("2025-03-01T12:30:00.654321").unwrap();
        assert_eq!(ts.as_datetime().hour(), 12);
        assert_eq!(ts.as_datetime().day(), 1);
    }

    #[test]
    fn test_parse_space_separated() {
        assert!(Timestamp::parse("2025-03-01 08:00:00").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Timestamp::parse("  "), Err(TimestampError::Empty));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            Timestamp::parse("not a date"),
            Err(TimestampError::Unrecognized(_))
        ));
    }

    #[test]
    fn test_display_short() {
        let ts = Timestamp::parse("2025-03-01T12:30:45Z").unwrap();
        assert_eq!(ts.display_short(), "2025-03-01 12:30");
    }

    #[test]
    fn test_deserialize_from_json() {
        let ts: Timestamp = serde_json::from_str("\"2024-12-24T18:00:00\"").unwrap();
        assert_eq!(ts.as_datetime().month(), 12);
    }
}
