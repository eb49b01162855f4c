//! Core domain types shared by the inkpress crates.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

// ---------------------------------------------------------------------------
// Frontmatter
// ---------------------------------------------------------------------------

/// Insertion-ordered metadata block of a document.
///
/// Keys are strings; values are YAML scalars, lists, or nested mappings.
/// Validation never mutates a `Frontmatter` in place: it produces a
/// normalized copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frontmatter(Mapping);

impl Frontmatter {
    pub fn new() -> Self {
        Self(Mapping::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// String value for `key`, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Insert or replace a field, keeping the original position of an existing key.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(Value::String(key.to_string()), value.into())
    }

    /// Tags as strings. Scalars are rendered; nested values are skipped.
    pub fn tags(&self) -> Vec<String> {
        match self.get("tags") {
            Some(Value::Sequence(items)) => items.iter().filter_map(scalar_to_string).collect(),
            _ => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.0.iter()
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    /// Render back to YAML (without the `---` delimiters).
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        if self.is_empty() {
            return Ok(String::new());
        }
        serde_yaml::to_string(&self.0)
    }
}

impl From<Mapping> for Frontmatter {
    fn from(mapping: Mapping) -> Self {
        Self(mapping)
    }
}

/// Render a YAML scalar as a string; `None` for null, sequences and mappings.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}
