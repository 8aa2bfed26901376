//! FILENAME: core/engine/src/path.rs
//! PURPOSE: Dot-addressable accessor paths into row objects.
//! CONTEXT: A column's `accessorKey` such as "donor.address.city" or
//! "payments.0.amount" walks nested objects and arrays of a JSON row.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A parsed accessor path. Segments are split on '.'.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AccessorPath {
    raw: String,
    segments: Vec<String>,
}

impl AccessorPath {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = raw
            .split('.')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        AccessorPath { raw, segments }
    }

    /// The path as written by the caller.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Resolve the path against a row. Returns `None` when any segment is missing.
    pub fn resolve<'a>(&self, row: &'a Value) -> Option<&'a Value> {
        // A flat key containing dots wins over nested traversal
        if self.segments.len() > 1 {
            if let Some(value) = row.get(self.raw.as_str()) {
                return Some(value);
            }
        }

        let mut current = row;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl From<String> for AccessorPath {
    fn from(raw: String) -> Self {
        AccessorPath::new(raw)
    }
}

impl From<&str> for AccessorPath {
    fn from(raw: &str) -> Self {
        AccessorPath::new(raw)
    }
}

impl From<AccessorPath> for String {
    fn from(path: AccessorPath) -> Self {
        path.raw
    }
}

impl fmt::Display for AccessorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_object_path() {
        let row = json!({ "donor": { "address": { "city": "Bnei Brak" } } });
        let path = AccessorPath::new("donor.address.city");
        assert_eq!(path.resolve(&row), Some(&json!("Bnei Brak")));
    }

    #[test]
    fn test_array_index_path() {
        let row = json!({ "payments": [{ "amount": 5 }, { "amount": 7 }] });
        assert_eq!(AccessorPath::new("payments.1.amount").resolve(&row), Some(&json!(7)));
        assert_eq!(AccessorPath::new("payments.9.amount").resolve(&row), None);
    }

    #[test]
    fn test_missing_segment() {
        let row = json!({ "donor": null });
        assert_eq!(AccessorPath::new("donor.name").resolve(&row), None);
    }

    #[test]
    fn test_flat_key_with_dot() {
        let row = json!({ "a.b": 1, "a": { "b": 2 } });
        assert_eq!(AccessorPath::new("a.b").resolve(&row), Some(&json!(1)));
    }

    #[test]
    fn test_serde_as_string() {
        let path: AccessorPath = serde_json::from_str("\"project.name\"").unwrap();
        assert_eq!(path.as_str(), "project.name");
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"project.name\"");
    }
}
