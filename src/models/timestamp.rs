//! Serde format for record timestamps.
//!
//! Every timestamp is written as RFC 3339 with exactly six fractional digits
//! and a `Z` suffix. chrono's default trims trailing zeros, so `.123Z` and
//! `.123456Z` would compare the wrong way round as text; with a fixed width,
//! string order in the store is time order.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

pub fn encode(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&encode(dt))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    DateTime::<Utc>::deserialize(deserializer)
}
