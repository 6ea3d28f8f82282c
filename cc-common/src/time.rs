//! Timestamp utilities
//!
//! The backend stores datetimes as `YYYY-MM-DD HH:MM:SS.sssZ` (a space, not a
//! `T`) and uses the empty string for "unset". Browsers and most JSON
//! producers send RFC 3339 instead, so both are accepted when reading.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Backend datetime layout
const BACKEND_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.fZ";

/// Parse a datetime in backend or RFC 3339 form.
///
/// Returns `None` for blank input or anything unparseable.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, BACKEND_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format a datetime the way JavaScript's `toISOString()` does
/// (millisecond precision, `Z` suffix). The backend accepts this form in
/// both record bodies and filter expressions.
pub fn to_iso_string(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter for optional backend datetimes.
///
/// Use with `#[serde(default, with = "cc_common::time::optional_datetime")]`.
pub mod optional_datetime {
    use super::{parse_datetime, to_iso_string};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&to_iso_string(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_datetime))
    }
}
