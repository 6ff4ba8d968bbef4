//! Serde codec for `Hash`-keyed maps nested under `flatten` or `untagged`.
//!
//! Buffered content hands map keys over as strings, which the plain `u32`
//! key impl rejects. Keys are written and read as decimal strings here.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Hash;

pub fn serialize<S, V>(map: &BTreeMap<Hash, V>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    s.collect_map(map.iter().map(|(k, v)| (k.to_string(), v)))
}

pub fn deserialize<'de, D, V>(d: D) -> Result<BTreeMap<Hash, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    let raw = BTreeMap::<String, V>::deserialize(d)?;
    raw.into_iter()
        .map(|(k, v)| k.parse::<Hash>().map(|h| (h, v)).map_err(|_| D::Error::custom(format!("invalid hash key {k:?}"))))
        .collect()
}
