use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Generic nested value produced by markup decoding.
///
/// Leaf text is never coerced, so `"12.50"` stays a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(String),
    Sequence(Vec<Value>),
    Mapping(IndexMap<String, Value>),
}

impl Value {
    pub fn empty_mapping() -> Self {
        Value::Mapping(IndexMap::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a key when this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Adds `child` under `key`, turning the slot into a sequence on repetition.
    ///
    /// Decoded elements are never sequences themselves, so a sequence already in
    /// the slot always comes from an earlier repetition.
    pub fn push_child(map: &mut IndexMap<String, Value>, key: String, child: Value) {
        match map.get_mut(&key) {
            None => {
                map.insert(key, child);
            }
            Some(Value::Sequence(items)) => {
                items.push(child);
            }
            Some(slot) => {
                let first = std::mem::replace(slot, Value::Sequence(Vec::new()));
                *slot = Value::Sequence(vec![first, child]);
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Scalar(s) => serde_json::Value::String(s.clone()),
            Value::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Mapping(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(value)
    }
}

/// Opaque option bag handed to the transport on every bind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientOptions(BTreeMap<String, String>);

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ClientOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Everything one remote call yields. `result` is the primary element.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub result: Value,
    pub raw_response: String,
    pub header: Option<Value>,
    pub raw_request: String,
}

impl CallOutcome {
    pub fn into_primary(self) -> Value {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_child_wraps_only_on_repetition() {
        let mut map = IndexMap::new();
        Value::push_child(&mut map, "item".to_string(), "A".into());
        assert_eq!(map["item"], Value::from("A"));

        Value::push_child(&mut map, "item".to_string(), "B".into());
        Value::push_child(&mut map, "item".to_string(), "C".into());
        assert_eq!(
            map["item"],
            Value::Sequence(vec!["A".into(), "B".into(), "C".into()])
        );
    }

    #[test]
    fn test_to_json_keeps_order_and_strings() {
        let mut map = IndexMap::new();
        map.insert("Price".to_string(), Value::from("12.50"));
        map.insert("Currency".to_string(), Value::from("USD"));
        let json = Value::Mapping(map).to_json();

        assert_eq!(json, serde_json::json!({"Price": "12.50", "Currency": "USD"}));
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Price", "Currency"]);
    }

    #[test]
    fn test_client_options_collect() {
        let options: ClientOptions = [("endpoint", "http://svc"), ("timeout_seconds", "5")]
            .into_iter()
            .collect();
        assert_eq!(options.get("endpoint"), Some("http://svc"));
        assert_eq!(options.get("missing"), None);
        assert!(!options.is_empty());
    }
}
