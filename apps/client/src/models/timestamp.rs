//! Timestamp (de)serialization tolerant of both backends.
//!
//! The job-listings backend emits RFC 3339 with an offset; the primary backend
//! stores naive timestamps and emits them without one. Naive values are UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

pub mod option {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse("2025-03-01T10:30:00+02:00").unwrap();
        assert_eq!(dt.hour(), 8);
    }

    #[test]
    fn test_parse_naive_as_utc() {
        let dt = parse("2025-03-01T10:30:00.123456").unwrap();
        assert_eq!((dt.day(), dt.hour(), dt.minute()), (1, 10, 30));
        assert!(parse("2025-03-01 10:30:00").is_some());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse("yesterday").is_none());
    }
}
