use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One selectable value of a dimension (an account, a region, a tag key, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    /// Organizational ancestry, outermost first. Only accounts carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
    /// Alternate spellings of a user tag key.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl Item {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_parents<I, S>(name: impl Into<String>, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            parents: Some(parents.into_iter().map(Into::into).collect()),
            aliases: Vec::new(),
        }
    }

    /// `/`-joined parent chain; empty for items without parents.
    pub fn path(&self) -> String {
        self.parents
            .as_deref()
            .map(|parents| parents.join("/"))
            .unwrap_or_default()
    }

    /// Tag key label including aliases, e.g. `Env/Environment`.
    pub fn display_name(&self) -> String {
        if self.aliases.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.name, self.aliases.join("/"))
        }
    }
}

/// The `{status, data}` wrapper most endpoints answer with.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub status: u16,
    #[serde(default)]
    pub data: Option<T>,
}

/// Per-series summary figures (`max`, `min`, `average`, `total`, ...).
pub type SeriesStats = BTreeMap<String, f64>;

/// Payload of `getData`. Series keep the backend's ordering.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DataResponse {
    pub status: u16,
    #[serde(default)]
    pub data: IndexMap<String, Vec<f64>>,
    /// Epoch millis of the first point.
    #[serde(default)]
    pub start: Option<i64>,
    /// Millis between points; absent when `time` carries explicit stamps.
    #[serde(default)]
    pub interval: Option<i64>,
    #[serde(default)]
    pub time: Option<Vec<i64>>,
    #[serde(default)]
    pub hours: Option<Vec<f64>>,
    #[serde(default)]
    pub stats: IndexMap<String, SeriesStats>,
}

/// Answer of `getTimeSpan`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeSpan {
    pub start: String,
    pub end: String,
}
