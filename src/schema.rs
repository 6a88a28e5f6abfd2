//! Input schemas shared by the entity services.
//!
//! Callers may name an attribute either by its canonical remote name
//! (`Title_c`) or by its legacy short name (`title`). [`normalize`] folds
//! both spellings onto the canonical one exactly once, at the service
//! boundary. [`Field`] keeps "not given" apart from "explicitly cleared".

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::record::Record;

/// A writable attribute of an input schema.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
    /// Not given; not sent.
    #[default]
    Absent,
    /// Explicitly cleared; sent as `null`.
    Null,
    Value(T),
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    /// `None` becomes [`Field::Null`].
    pub fn or_null(value: Option<T>) -> Self {
        value.map_or(Field::Null, Field::Value)
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Value(value)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Value(v) => v.serialize(serializer),
            Field::Absent | Field::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Field::or_null)
    }
}

/// Canonical and legacy spelling of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAlias {
    pub canonical: &'static str,
    pub legacy: &'static str,
}

/// Rewrites `input` to canonical names.
///
/// A canonical key wins over its legacy twin when both are present. Keys
/// that are neither are dropped.
pub fn normalize(input: &Map<String, Value>, aliases: &[FieldAlias]) -> Map<String, Value> {
    let mut out = Map::new();
    for alias in aliases {
        if let Some(value) = input.get(alias.canonical).or_else(|| input.get(alias.legacy)) {
            out.insert(alias.canonical.to_string(), value.clone());
        }
    }
    for key in input.keys() {
        if !aliases
            .iter()
            .any(|a| a.canonical == key || a.legacy == key)
        {
            tracing::debug!(key, "dropping unknown input field");
        }
    }
    out
}

/// Parses a loosely named JSON object into an input schema.
pub fn from_loose<T: DeserializeOwned>(
    input: &Value,
    aliases: &[FieldAlias],
) -> Result<T, serde_json::Error> {
    let normalized = match input {
        Value::Object(map) => Value::Object(normalize(map, aliases)),
        other => other.clone(),
    };
    serde_json::from_value(normalized)
}

/// Serializes an input schema into the record sent to the service.
pub fn to_record<T: Serialize>(input: &T) -> Record {
    match serde_json::to_value(input) {
        Ok(Value::Object(map)) => map,
        _ => Record::new(),
    }
}

/// Date fields arrive as `YYYY-MM-DD`, as full timestamps, as `""` or as `null`.
pub mod lenient_date {
    use super::*;

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => s.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        Ok(Option::<String>::deserialize(d)?.as_deref().and_then(parse))
    }
}

/// Timestamps are RFC 3339, or naive (taken as UTC).
pub mod lenient_timestamp {
    use super::*;

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|n| n.and_utc())
            })
    }

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => s.serialize_str(&t.to_rfc3339()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(Option::<String>::deserialize(d)?.as_deref().and_then(parse))
    }
}
