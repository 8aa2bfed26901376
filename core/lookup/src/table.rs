//! FILENAME: core/lookup/src/table.rs
//! PURPOSE: Resolved index of one reference dataset.
//! CONTEXT: Ids are compared as strings regardless of whether the source
//! used numeric or textual keys, matching how row values are stringified
//! for filtering.

use engine::log_warn;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Stringified identifier of a lookup item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LookupId(pub String);

impl LookupId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LookupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for LookupId {
    fn from(id: String) -> Self {
        LookupId(id)
    }
}

impl From<&str> for LookupId {
    fn from(id: &str) -> Self {
        LookupId(id.to_string())
    }
}

macro_rules! lookup_id_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for LookupId {
            fn from(id: $t) -> Self {
                LookupId(id.to_string())
            }
        })*
    };
}

lookup_id_from_int!(i32, i64, u32, u64, usize);

/// One id/label pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntry {
    pub id: String,
    pub label: String,
}

/// Selection-UI option (`{ value, label }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOption {
    pub value: String,
    pub label: String,
}

/// Fetched dataset with its id index. The typed items are kept behind `Any`
/// so one cache can hold datasets of different item types.
#[derive(Clone)]
pub struct LookupTable {
    key: String,
    entries: Vec<LookupEntry>,
    by_id: HashMap<String, usize>,
    items: Arc<dyn Any + Send + Sync>,
}

impl LookupTable {
    /// Index `items` by id. Duplicate ids keep the first occurrence.
    pub fn build<T: Send + Sync + 'static>(
        key: &str,
        items: Vec<T>,
        get_id: &dyn Fn(&T) -> LookupId,
        get_label: &dyn Fn(&T) -> String,
    ) -> Self {
        let mut entries = Vec::with_capacity(items.len());
        let mut by_id = HashMap::with_capacity(items.len());

        for item in &items {
            let id = get_id(item).0;
            if by_id.contains_key(&id) {
                log_warn!("LOOKUP", "duplicate id '{}' in lookup '{}'", id, key);
                entries.push(LookupEntry { id: String::new(), label: String::new() });
                continue;
            }
            by_id.insert(id.clone(), entries.len());
            entries.push(LookupEntry { id, label: get_label(item) });
        }

        LookupTable {
            key: key.to_string(),
            entries,
            by_id,
            items: Arc::new(items),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Label for an id, if present.
    pub fn label(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).map(|&i| self.entries[i].label.as_str())
    }

    /// Entries in source order.
    pub fn entries(&self) -> impl Iterator<Item = &LookupEntry> {
        let by_id = &self.by_id;
        self.entries
            .iter()
            .enumerate()
            .filter(move |(i, e)| by_id.get(&e.id) == Some(i))
            .map(|(_, e)| e)
    }

    /// `{ value, label }` list for selection UI.
    pub fn options(&self) -> Vec<LookupOption> {
        self.entries()
            .map(|e| LookupOption { value: e.id.clone(), label: e.label.clone() })
            .collect()
    }

    /// Typed items, when `T` matches the definition's item type.
    pub fn data<T: 'static>(&self) -> Option<&[T]> {
        self.items.downcast_ref::<Vec<T>>().map(Vec::as_slice)
    }

    /// Typed item for an id.
    pub fn get_by_id<T: 'static>(&self, id: &str) -> Option<&T> {
        let index = *self.by_id.get(id)?;
        self.data::<T>()?.get(index)
    }
}

impl fmt::Debug for LookupTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupTable")
            .field("key", &self.key)
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct City {
        id: u32,
        name: &'static str,
    }

    fn cities() -> LookupTable {
        LookupTable::build(
            "cities",
            vec![
                City { id: 1, name: "Jerusalem" },
                City { id: 2, name: "Haifa" },
                City { id: 1, name: "Duplicate" },
            ],
            &|c: &City| c.id.into(),
            &|c: &City| c.name.to_string(),
        )
    }

    #[test]
    fn test_label_by_stringified_id() {
        let table = cities();
        assert_eq!(table.label("2"), Some("Haifa"));
        assert_eq!(table.label("9"), None);
    }

    #[test]
    fn test_duplicates_keep_first() {
        let table = cities();
        assert_eq!(table.len(), 2);
        assert_eq!(table.label("1"), Some("Jerusalem"));
        assert_eq!(table.options().len(), 2);
    }

    #[test]
    fn test_typed_access() {
        let table = cities();
        assert_eq!(table.data::<City>().map(|d| d.len()), Some(3));
        assert_eq!(table.get_by_id::<City>("2").map(|c| c.name), Some("Haifa"));
        assert!(table.data::<String>().is_none());
    }
}
