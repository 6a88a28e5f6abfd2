use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned integer identifier of a record.
///
/// Always serialized as a JSON integer. Deserialization also accepts the
/// shapes the record service and older call sites produce: numeric strings
/// and lookup objects such as `{"Id": 3, "Name": "Website"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl RecordId {
    /// Coerces a loosely typed identifier such as a route parameter.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().map(Self)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

struct RecordIdVisitor;

impl<'de> Visitor<'de> for RecordIdVisitor {
    type Value = RecordId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer id, a numeric string or a lookup object with an Id")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RecordId, E> {
        Ok(RecordId(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RecordId, E> {
        i64::try_from(v)
            .map(RecordId)
            .map_err(|_| E::custom(format!("id {v} out of range")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<RecordId, E> {
        if v.fract() == 0.0 && v.is_finite() {
            Ok(RecordId(v as i64))
        } else {
            Err(E::custom(format!("id {v} is not an integer")))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RecordId, E> {
        RecordId::parse(v).ok_or_else(|| E::custom(format!("id {v:?} is not numeric")))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RecordId, A::Error> {
        let mut id = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == "Id" {
                id = Some(map.next_value::<RecordId>()?);
            } else {
                map.next_value::<de::IgnoredAny>()?;
            }
        }
        id.ok_or_else(|| de::Error::missing_field("Id"))
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RecordIdVisitor)
    }
}
