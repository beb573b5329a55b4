//! Lenient decoding for the game's exports: numbers that arrive as strings,
//! maps that arrive as `[]` when empty, and maps whose key order matters.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

/// A JSON object decoded as an ordered list of entries.
///
/// Attacker slots and report tie-breaks depend on the export's key order, so
/// these objects are never collected into a hash or B-tree map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        OrderedMap(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.0.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        OrderedMap(iter.into_iter().collect())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object (or an empty array)")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }

            // Empty objects are serialized as `[]` by the game server.
            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                if seq.next_element::<de::IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_type(
                        de::Unexpected::Seq,
                        &"an object or an empty array",
                    ));
                }
                Ok(OrderedMap::default())
            }
        }

        deserializer.deserialize_any(OrderedVisitor(PhantomData))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
}

impl Loose {
    fn into_f64<E: de::Error>(self) -> Result<f64, E> {
        match self {
            Loose::Unsigned(v) => Ok(v as f64),
            Loose::Signed(v) => Ok(v as f64),
            Loose::Float(v) => Ok(v),
            Loose::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(&text), &"a numeric string")),
        }
    }

    fn into_i64<E: de::Error>(self) -> Result<i64, E> {
        match self {
            Loose::Unsigned(v) => {
                i64::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &"an i64"))
            }
            Loose::Signed(v) => Ok(v),
            Loose::Float(v) if v.fract() == 0.0 => Ok(v as i64),
            Loose::Float(v) => Err(E::invalid_value(de::Unexpected::Float(v), &"an integer")),
            Loose::Text(text) => {
                let trimmed = text.trim();
                trimmed
                    .parse::<i64>()
                    .or_else(|_| match trimmed.parse::<f64>() {
                        Ok(v) if v.fract() == 0.0 => Ok(v as i64),
                        _ => Err(()),
                    })
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(&text), &"an integer string"))
            }
        }
    }

    fn into_u64<E: de::Error>(self) -> Result<u64, E> {
        let value = self.into_i64::<E>()?;
        u64::try_from(value)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &"a non-negative integer"))
    }
}

pub fn u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Loose::deserialize(deserializer)?.into_u64()
}

pub fn u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Loose::deserialize(deserializer)?.into_u64::<D::Error>()?;
    ::core::primitive::u32::try_from(value)
        .map_err(|_| de::Error::invalid_value(de::Unexpected::Unsigned(value), &"a u32"))
}

pub fn i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Loose::deserialize(deserializer)?.into_i64()
}

pub fn f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Loose::deserialize(deserializer)?.into_f64()
}

/// Numeric ids and role codes come through as either strings or numbers.
pub fn opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value: Option<Loose> = Option::deserialize(deserializer)?;
    Ok(value.map(|loose| match loose {
        Loose::Unsigned(v) => v.to_string(),
        Loose::Signed(v) => v.to_string(),
        Loose::Float(v) => v.to_string(),
        Loose::Text(text) => text,
    }))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "super::u64")]
        damage: u64,
        #[serde(default, deserialize_with = "super::f64")]
        magnitude: f64,
        #[serde(default, deserialize_with = "super::opt_string")]
        role: Option<String>,
        #[serde(default)]
        slots: OrderedMap<u32>,
    }

    #[test]
    fn numeric_strings_and_numbers_decode_alike() {
        let a: Sample = serde_json::from_str(r#"{"damage":"1200","magnitude":"2.5","role":3}"#)
            .expect("parse");
        let b: Sample = serde_json::from_str(r#"{"damage":1200,"magnitude":2.5,"role":"3"}"#)
            .expect("parse");
        assert_eq!(a.damage, b.damage);
        assert_eq!(a.magnitude, b.magnitude);
        assert_eq!(a.role.as_deref(), Some("3"));
        assert_eq!(b.role.as_deref(), Some("3"));
    }

    #[test]
    fn negative_damage_is_rejected() {
        let result: Result<Sample, _> = serde_json::from_str(r#"{"damage":-5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn ordered_map_keeps_source_order() {
        let sample: Sample =
            serde_json::from_str(r#"{"damage":0,"slots":{"40":1,"7":2,"13":3}}"#).expect("parse");
        let keys: Vec<&str> = sample.slots.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["40", "7", "13"]);
        assert_eq!(sample.slots.get("7"), Some(&2));
    }

    #[test]
    fn empty_array_decodes_as_empty_map() {
        let sample: Sample = serde_json::from_str(r#"{"damage":0,"slots":[]}"#).expect("parse");
        assert!(sample.slots.is_empty());
        let bad: Result<Sample, _> = serde_json::from_str(r#"{"damage":0,"slots":[1]}"#);
        assert!(bad.is_err());
    }
}
