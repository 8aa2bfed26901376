//! FILENAME: core/persistence/src/export_cache.rs
//! PURPOSE: Lookup translations resolved up front for one export run.
//! CONTEXT: Created per call and dropped with it. Every lookup dataset the
//! exported columns need is fetched before the first row is written, so the
//! writer only does synchronous reads.

use lookup::{LookupCache, LookupError, LookupSource, LookupState, LookupTable};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default, Clone)]
pub struct ExportCache {
    tables: HashMap<String, Arc<LookupTable>>,
}

impl ExportCache {
    /// Resolve every key through the shared cache. The first failure aborts.
    pub async fn prefetch<'a, I>(cache: &LookupCache, keys: I) -> Result<Self, LookupError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        Ok(ExportCache { tables: cache.prefetch(keys).await? })
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl LookupSource for ExportCache {
    fn lookup(&self, key: &str) -> LookupState {
        match self.tables.get(key) {
            Some(table) => LookupState::Ready(table.clone()),
            None => LookupState::Failed,
        }
    }
}
