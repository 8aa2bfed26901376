//! FILENAME: core/engine/src/cell.rs
//! PURPOSE: Normalized scalar view of a single table cell.
//! CONTEXT: Rows arrive as loosely typed JSON objects. Sorting, filtering,
//! faceting and summaries all work on `CellValue`, the normalized form of
//! whatever an accessor path resolved to.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Represents the normalized content of a table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    List(Vec<CellValue>),
}

impl CellValue {
    /// Normalize an accessor result. A missing value and JSON `null` are both `Empty`.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => CellValue::Empty,
            Some(Value::Bool(b)) => CellValue::Boolean(*b),
            Some(Value::Number(n)) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Empty),
            Some(Value::String(s)) => CellValue::Text(s.clone()),
            Some(Value::Array(items)) => {
                CellValue::List(items.iter().map(|v| CellValue::from_json(Some(v))).collect())
            }
            // Objects (avatars, nested references) are identified by their label-ish field
            Some(Value::Object(map)) => ["label", "name", "title", "id"]
                .iter()
                .find_map(|key| map.get(*key))
                .map(|v| CellValue::from_json(Some(v)))
                .unwrap_or(CellValue::Empty),
        }
    }

    /// True for missing values and empty strings.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Numeric coercion used by range filters and summaries.
    /// Text is accepted only when it parses cleanly; booleans and blanks are not numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
                }
            }
            _ => None,
        }
    }

    /// Boolean coercion used by boolean columns.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(b) => Some(*b),
            CellValue::Number(n) => Some(*n != 0.0),
            CellValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Contribution of this cell to a column sum. Non-numeric cells count as zero.
    pub fn sum_contribution(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    /// Stringified identity used by set-membership filters and facets.
    pub fn filter_key(&self) -> String {
        match self {
            CellValue::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
            other => other.display_value(),
        }
    }

    /// Keys of every element for list values, or the single key otherwise.
    pub fn filter_keys(&self) -> Vec<String> {
        match self {
            CellValue::List(items) => items.iter().map(CellValue::filter_key).collect(),
            CellValue::Empty => Vec::new(),
            other => vec![other.filter_key()],
        }
    }

    /// Returns the display value of the cell as a String.
    pub fn display_value(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
            CellValue::List(items) => items
                .iter()
                .map(CellValue::display_value)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Type-aware ordering. Blanks are not handled here; callers place them last.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (CellValue::Boolean(a), CellValue::Boolean(b)) => a.cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => {
                match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
                    (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                    _ => a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)),
                }
            }
            (CellValue::List(a), CellValue::List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = x.compare(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            CellValue::Number(_) => 0,
            CellValue::Boolean(_) => 1,
            CellValue::Text(_) => 2,
            CellValue::List(_) => 3,
            CellValue::Empty => 4,
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_and_missing_are_empty() {
        assert_eq!(CellValue::from_json(None), CellValue::Empty);
        assert_eq!(CellValue::from_json(Some(&Value::Null)), CellValue::Empty);
        assert!(CellValue::Text(String::new()).is_empty());
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(CellValue::Number(10.0).as_number(), Some(10.0));
        assert_eq!(CellValue::Text(" 12.5 ".to_string()).as_number(), Some(12.5));
        assert_eq!(CellValue::Text("abc".to_string()).as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);
        assert_eq!(CellValue::Boolean(true).as_number(), None);
        assert_eq!(CellValue::Text("abc".to_string()).sum_contribution(), 0.0);
    }

    #[test]
    fn test_filter_keys() {
        assert_eq!(CellValue::Number(10.0).filter_key(), "10");
        assert_eq!(CellValue::Number(2.5).filter_key(), "2.5");
        assert_eq!(CellValue::Boolean(false).filter_key(), "false");

        let list = CellValue::from_json(Some(&json!([1, "a"])));
        assert_eq!(list.filter_keys(), vec!["1".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_object_uses_label_field() {
        let value = json!({ "id": 7, "name": "Cohen" });
        assert_eq!(CellValue::from_json(Some(&value)), CellValue::Text("Cohen".to_string()));
    }

    #[test]
    fn test_compare() {
        let a = CellValue::Text("apple".to_string());
        let b = CellValue::Text("Banana".to_string());
        assert_eq!(a.compare(&b), Ordering::Less);

        let ten = CellValue::Text("10".to_string());
        let nine = CellValue::Text("9".to_string());
        assert_eq!(ten.compare(&nine), Ordering::Greater);

        assert_eq!(CellValue::Number(1.0).compare(&CellValue::Number(2.0)), Ordering::Less);
    }
}
