//! Free-form metadata bag attached to an entity.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// String-keyed map of arbitrary JSON values.
///
/// State hooks write timestamps and reasons here; the scheduler records
/// failures of deferred transitions here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: HashMap<String, Value>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Get a value if it is a JSON string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_and_read_back() {
        let mut metadata = Metadata::new();
        assert!(metadata.insert("carrier", "UPS").is_none());
        metadata.insert("weight_kg", 2.5);

        assert_eq!(metadata.get_str("carrier"), Some("UPS"));
        assert_eq!(metadata.get("weight_kg"), Some(&json!(2.5)));
        assert_eq!(metadata.get_str("weight_kg"), None);
        assert_eq!(metadata.len(), 2);
    }

    #[test]
    fn insert_replaces_existing_value() {
        let mut metadata = Metadata::new();
        metadata.insert("attempts", 1);
        let previous = metadata.insert("attempts", 2);

        assert_eq!(previous, Some(json!(1)));
        assert_eq!(metadata.get("attempts"), Some(&json!(2)));
    }

    #[test]
    fn serializes_as_plain_object() {
        let mut metadata = Metadata::new();
        metadata.insert("carrier", "UPS");

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json, json!({ "carrier": "UPS" }));
    }
}
