use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A scalar request parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Flat key/value parameter bag sent as a JSON body (POST), a query string
/// (GET), or a synthetic download form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, ParamValue>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Text rendering of a parameter, as it would appear on the wire.
    pub fn text(&self, key: &str) -> Option<String> {
        self.0.get(key).map(ToString::to_string)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Every entry of `other` replaces the entry of the same key here.
    pub fn merge(&mut self, other: &QueryParams) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Stringified pairs for query strings and form fields.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overrides_existing_keys() {
        let mut base = QueryParams::new()
            .with("consolidate", "daily")
            .with("breakdown", false);
        let page = QueryParams::new()
            .with("consolidate", "monthly")
            .with("forReservation", true);
        base.merge(&page);

        assert_eq!(base.text("consolidate").as_deref(), Some("monthly"));
        assert_eq!(base.text("breakdown").as_deref(), Some("false"));
        assert_eq!(base.get("forReservation"), Some(&ParamValue::Bool(true)));
    }

    #[test]
    fn serializes_as_flat_json_object() {
        let params = QueryParams::new().with("index", 2usize).with("account", "a,b");
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!({ "index": 2, "account": "a,b" }));
    }
}
