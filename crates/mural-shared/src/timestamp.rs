//! ISO-8601 timestamps as stored in records (`2024-05-01T12:30:00.000Z`).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

pub fn to_iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_iso(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// Day/month/year, the way review cards print dates.
pub fn short_date(ts: &DateTime<Utc>) -> String {
    ts.format("%d/%m/%Y").to_string()
}

/// `#[serde(with = "iso_millis")]` for `DateTime<Utc>` fields.
pub mod iso_millis {
    use super::*;

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&to_iso(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse_iso(&raw).map_err(serde::de::Error::custom)
    }
}
