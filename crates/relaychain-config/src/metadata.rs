//! Free-form component metadata.
//!
//! Connector, dialer, node and chain blocks carry an untyped key/value map.
//! Keys are case-insensitive (lowercased on construction); typed getters
//! accept both native values and their string spellings so the same
//! metadata reads identically from JSON, YAML and TOML.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A metadata value had the wrong type for the key it was read as.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("metadata key '{key}': expected {expected}")]
pub struct MetadataError {
    pub key: String,
    pub expected: &'static str,
}

impl MetadataError {
    fn new(key: &str, expected: &'static str) -> Self {
        Self {
            key: key.to_string(),
            expected,
        }
    }
}

/// Untyped component metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Metadata(Map<String, Value>);

impl From<Map<String, Value>> for Metadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(
            map.into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v))
                .collect(),
        )
    }
}

impl From<Metadata> for Map<String, Value> {
    fn from(md: Metadata) -> Self {
        md.0
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::from(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect::<Map<String, Value>>(),
        )
    }
}

impl Metadata {
    /// Empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(&key.to_ascii_lowercase())
    }

    /// Raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(&key.to_ascii_lowercase())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// String value. Numbers and booleans are rendered as text.
    pub fn get_string(&self, key: &str) -> Result<Option<String>, MetadataError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(_) => Err(MetadataError::new(key, "string")),
        }
    }

    /// Boolean value. Accepts `true`/`false` and their string spellings.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, MetadataError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Some(true)),
                "false" | "no" | "off" | "0" => Ok(Some(false)),
                _ => Err(MetadataError::new(key, "boolean")),
            },
            Some(_) => Err(MetadataError::new(key, "boolean")),
        }
    }

    /// Unsigned integer value. Accepts numbers and numeric strings.
    pub fn get_u64(&self, key: &str) -> Result<Option<u64>, MetadataError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .map(Some)
                .ok_or_else(|| MetadataError::new(key, "unsigned integer")),
            Some(Value::String(s)) => s
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| MetadataError::new(key, "unsigned integer")),
            Some(_) => Err(MetadataError::new(key, "unsigned integer")),
        }
    }

    /// String-to-string map value (e.g. extra HTTP headers).
    pub fn get_string_map(
        &self,
        key: &str,
    ) -> Result<Option<HashMap<String, String>>, MetadataError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(k, v)| match v {
                    Value::String(s) => Ok((k.clone(), s.clone())),
                    Value::Number(n) => Ok((k.clone(), n.to_string())),
                    Value::Bool(b) => Ok((k.clone(), b.to_string())),
                    _ => Err(MetadataError::new(key, "map of strings")),
                })
                .collect::<Result<HashMap<_, _>, _>>()
                .map(Some),
            Some(_) => Err(MetadataError::new(key, "map of strings")),
        }
    }
}
