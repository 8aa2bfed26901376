//! FILENAME: core/lookup/src/definition.rs
//! PURPOSE: Describes how to fetch a reference dataset and read its ids and labels.

use crate::error::LookupError;
use crate::table::{LookupId, LookupTable};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

type QueryFn<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<Vec<T>, String>> + Send + Sync>;
type IdFn<T> = Arc<dyn Fn(&T) -> LookupId + Send + Sync>;
type LabelFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// One reference dataset: `{ query_key, query_fn, get_id, get_label }`.
pub struct LookupDefinition<T> {
    query_key: String,
    query_fn: QueryFn<T>,
    get_id: IdFn<T>,
    get_label: LabelFn<T>,
}

impl<T: Send + Sync + 'static> LookupDefinition<T> {
    pub fn new<Q, Fut, E, I, L>(query_key: impl Into<String>, query_fn: Q, get_id: I, get_label: L) -> Self
    where
        Q: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>, E>> + Send + 'static,
        E: Display + Send + 'static,
        I: Fn(&T) -> LookupId + Send + Sync + 'static,
        L: Fn(&T) -> String + Send + Sync + 'static,
    {
        let query_fn: QueryFn<T> = Arc::new(move || {
            let fut = query_fn();
            async move { fut.await.map_err(|e| e.to_string()) }.boxed()
        });

        LookupDefinition {
            query_key: query_key.into(),
            query_fn,
            get_id: Arc::new(get_id),
            get_label: Arc::new(get_label),
        }
    }

    pub fn query_key(&self) -> &str {
        &self.query_key
    }
}

/// Type-erased definition so one registry can hold datasets of different item types.
pub(crate) trait ErasedLookup: Send + Sync {
    fn fetch(&self) -> BoxFuture<'static, Result<LookupTable, LookupError>>;
}

impl<T: Send + Sync + 'static> ErasedLookup for LookupDefinition<T> {
    fn fetch(&self) -> BoxFuture<'static, Result<LookupTable, LookupError>> {
        let key = self.query_key.clone();
        let query = self.query_fn.clone();
        let get_id = self.get_id.clone();
        let get_label = self.get_label.clone();

        async move {
            let items = query()
                .await
                .map_err(|message| LookupError::Fetch { key: key.clone(), message })?;
            Ok(LookupTable::build(&key, items, &*get_id, &*get_label))
        }
        .boxed()
    }
}

/// Statically registered lookup definitions, keyed by query key.
#[derive(Default, Clone)]
pub struct LookupRegistry {
    definitions: HashMap<String, Arc<dyn ErasedLookup>>,
}

impl LookupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. A later registration under the same key replaces the earlier one.
    pub fn register<T: Send + Sync + 'static>(&mut self, definition: LookupDefinition<T>) {
        self.definitions
            .insert(definition.query_key.clone(), Arc::new(definition));
    }

    pub fn with<T: Send + Sync + 'static>(mut self, definition: LookupDefinition<T>) -> Self {
        self.register(definition);
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.definitions.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<dyn ErasedLookup>> {
        self.definitions.get(key).cloned()
    }
}

impl std::fmt::Debug for LookupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("LookupRegistry").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Currency {
        code: &'static str,
        name: &'static str,
    }

    #[tokio::test]
    async fn test_fetch_builds_table() {
        let def = LookupDefinition::new(
            "currencies",
            || async { Ok::<_, String>(vec![Currency { code: "ILS", name: "שקל" }]) },
            |c: &Currency| c.code.into(),
            |c: &Currency| c.name.to_string(),
        );

        let table = def.fetch().await.unwrap();
        assert_eq!(table.key(), "currencies");
        assert_eq!(table.label("ILS"), Some("שקל"));
    }

    #[tokio::test]
    async fn test_fetch_error_carries_key() {
        let def = LookupDefinition::new(
            "cities",
            || async { Err::<Vec<Currency>, _>("timeout") },
            |c: &Currency| c.code.into(),
            |c: &Currency| c.name.to_string(),
        );

        let err = def.fetch().await.unwrap_err();
        assert_eq!(
            err,
            LookupError::Fetch { key: "cities".to_string(), message: "timeout".to_string() }
        );
    }

    #[test]
    fn test_registry_keys() {
        let registry = LookupRegistry::new().with(LookupDefinition::new(
            "projects",
            || async { Ok::<Vec<Currency>, String>(Vec::new()) },
            |c: &Currency| c.code.into(),
            |c: &Currency| c.name.to_string(),
        ));
        assert!(registry.contains("projects"));
        assert!(!registry.contains("users"));
    }
}
