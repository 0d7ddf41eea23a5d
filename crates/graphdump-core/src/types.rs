//! Record types scraped or fetched from the source graph.
//!
//! A record only lives while one result row is being turned into a
//! statement; nothing here is persisted.

use serde::{Deserialize, Serialize};

// ── Property Values ───────────────────────────────────────────────

/// A single property value, typed as far as the source allowed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Only produced by the structured source; text scraping never
    /// recognises list literals.
    List(Vec<PropertyValue>),
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

/// Insertion-ordered property map.
///
/// Keys keep the position they were first seen at. Inserting an existing
/// key replaces its value in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PropertyMap(Vec<(String, PropertyValue)>);

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// True for a name usable unquoted as a label, relationship type or
/// property key: a letter or `_` followed by letters, digits or `_`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

// ── Records ───────────────────────────────────────────────────────

/// A node: its labels in source order plus its properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeRecord {
    pub labels: Vec<String>,
    pub properties: PropertyMap,
}

/// Properties carried by a relationship.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RelationshipProperties {
    /// A map literal copied verbatim from rendered client output.
    Verbatim(String),
    /// Typed properties read through the driver.
    Typed(PropertyMap),
}

/// A directed relationship between two nodes identified by their
/// identity property (the IRI by default).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelationshipRecord {
    pub from_id: String,
    pub rel_type: String,
    pub properties: Option<RelationshipProperties>,
    pub to_id: String,
}

/// Kind of source a record was read from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Rendered plain-text output of the command-line client.
    #[default]
    Shell,
    /// Row objects from the Bolt driver.
    Bolt,
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shell" => Ok(Self::Shell),
            "bolt" => Ok(Self::Bolt),
            other => Err(format!("unknown source {other:?} (expected shell or bolt)")),
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shell => write!(f, "shell"),
            Self::Bolt => write!(f, "bolt"),
        }
    }
}
