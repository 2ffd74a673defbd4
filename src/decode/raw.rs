//! One level of a not-yet-typed JSON document
//!
//! A `RawDocument` maps each key of one JSON object to its raw, unparsed
//! sub-value. Values borrow from the input bytes; nested levels are parsed
//! only when the decoder reaches them.

use std::collections::HashMap;
use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::value::RawValue;

use super::errors::{DecodeError, DecodeResult};

/// Key → raw sub-value pairs of one JSON object, in document order
#[derive(Debug)]
pub struct RawDocument<'a> {
    entries: Vec<(String, &'a RawValue)>,
    positions: HashMap<String, usize>,
    /// First key seen twice, if any
    duplicate: Option<String>,
}

impl<'a> RawDocument<'a> {
    /// Parses one object level from bytes.
    pub fn parse(bytes: &'a [u8]) -> DecodeResult<Self> {
        let document: RawDocument<'a> =
            serde_json::from_slice(bytes).map_err(DecodeError::malformed)?;
        document.reject_duplicates()
    }

    /// Parses one object level from an already-delimited raw value.
    pub fn from_raw(raw: &'a RawValue) -> DecodeResult<Self> {
        let document: RawDocument<'a> =
            serde_json::from_str(raw.get()).map_err(DecodeError::malformed)?;
        document.reject_duplicates()
    }

    fn reject_duplicates(self) -> DecodeResult<Self> {
        match self.duplicate {
            Some(key) => Err(DecodeError::DuplicateField { key }),
            None => Ok(self),
        }
    }

    /// Raw sub-value for `key`
    pub fn get(&self, key: &str) -> Option<&'a RawValue> {
        self.positions.get(key).map(|&position| self.entries[position].1)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// Keys in document order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> impl Iterator<Item = (String, &'a RawValue)> {
        self.entries.into_iter()
    }
}

impl<'de: 'a, 'a> Deserialize<'de> for RawDocument<'a> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(DocumentVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

struct DocumentVisitor<'a> {
    marker: std::marker::PhantomData<&'a ()>,
}

impl<'de: 'a, 'a> Visitor<'de> for DocumentVisitor<'a> {
    type Value = RawDocument<'a>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let capacity = map.size_hint().unwrap_or(0);
        let mut entries = Vec::with_capacity(capacity);
        let mut positions = HashMap::with_capacity(capacity);
        let mut duplicate = None;

        while let Some(key) = map.next_key::<String>()? {
            let value: &'de RawValue = map.next_value()?;
            if positions.contains_key(&key) {
                duplicate.get_or_insert(key);
                continue;
            }
            positions.insert(key.clone(), entries.len());
            entries.push((key, value));
        }

        Ok(RawDocument {
            entries,
            positions,
            duplicate,
        })
    }
}

/// Parses a raw value as a JSON array of raw elements.
pub(crate) fn parse_sequence(raw: &RawValue) -> Result<Vec<&RawValue>, serde_json::Error> {
    serde_json::from_str(raw.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_in_document_order() {
        let document = RawDocument::parse(br#"{"b": 1, "a": {"nested": true}, "c": [1, 2]}"#).unwrap();
        assert_eq!(document.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(document.len(), 3);
        assert!(document.contains("a"));
        assert!(!document.contains("nested"));
    }

    #[test]
    fn test_nested_levels_stay_raw() {
        let document = RawDocument::parse(br#"{"a": {"nested": [1, 2]}}"#).unwrap();
        assert_eq!(document.get("a").unwrap().get(), r#"{"nested": [1, 2]}"#);
    }

    #[test]
    fn test_escaped_keys() {
        let document = RawDocument::parse(r#"{"quo\"te": 1, "café": 2}"#.as_bytes()).unwrap();
        assert!(document.contains("quo\"te"));
        assert!(document.contains("café"));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let err = RawDocument::parse(br#"{"a": 1, "b": 2, "a": 3}"#).unwrap_err();
        assert!(matches!(err, DecodeError::DuplicateField { ref key } if key == "a"));
    }

    #[test]
    fn test_non_object_rejected() {
        let inputs: [&[u8]; 6] = [b"[1, 2]", b"123", b"null", b"\"text\"", b"{\"a\": 1", b"{} {}"];
        for input in inputs {
            let err = RawDocument::parse(input).unwrap_err();
            assert!(matches!(err, DecodeError::MalformedDocument { .. }), "input {:?}", input);
        }
    }

    #[test]
    fn test_from_raw() {
        let outer = RawDocument::parse(br#"{"inner": {"x": 1}}"#).unwrap();
        let inner = RawDocument::from_raw(outer.get("inner").unwrap()).unwrap();
        assert_eq!(inner.get("x").unwrap().get(), "1");
    }

    #[test]
    fn test_empty_object() {
        let document = RawDocument::parse(b" { } ").unwrap();
        assert!(document.is_empty());
    }

    #[test]
    fn test_parse_sequence() {
        let document = RawDocument::parse(br#"{"s": [{"a": 1}, 2, "x"], "n": 5}"#).unwrap();
        let items = parse_sequence(document.get("s").unwrap()).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].get(), r#"{"a": 1}"#);
        assert!(parse_sequence(document.get("n").unwrap()).is_err());
    }
}
