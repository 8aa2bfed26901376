//! FILENAME: core/lookup/src/cache.rs
//! PURPOSE: Shared async cache of resolved lookup datasets.
//! CONTEXT: One `LookupCache` is shared by every consumer of reference data.
//! Each key gets a slot; concurrent `resolve` calls for the same key wait on
//! the slot's fetch lock so only one request is in flight. A resolved dataset
//! is served until the staleness window passes. Stale data stays visible
//! through `view` while the refetch runs.

use crate::definition::LookupRegistry;
use crate::error::LookupError;
use crate::source::{LookupSource, LookupState};
use crate::table::{LookupOption, LookupTable};
use engine::{log_debug, log_warn};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

// ============================================================================
// CONFIG
// ============================================================================

/// Cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LookupConfig {
    /// How long a fetched dataset is served before the next `resolve` refetches it.
    ///
    /// Default: 1 hour
    pub stale_time_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            stale_time_secs: 3600,
        }
    }
}

impl LookupConfig {
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time_secs = stale_time.as_secs();
        self
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }
}

// ============================================================================
// SLOTS
// ============================================================================

#[derive(Debug, Clone)]
enum SlotState {
    Idle,
    Loading { previous: Option<Arc<LookupTable>> },
    Ready { table: Arc<LookupTable>, fetched_at: Instant },
    Failed { message: String, failed_at: Instant },
}

#[derive(Debug)]
struct Slot {
    fetch_lock: tokio::sync::Mutex<()>,
    state: RwLock<SlotState>,
}

impl Slot {
    fn new() -> Self {
        Slot {
            fetch_lock: tokio::sync::Mutex::new(()),
            state: RwLock::new(SlotState::Idle),
        }
    }

    fn state(&self) -> SlotState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set(&self, state: SlotState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// The cached table if it was fetched within `stale_time`.
    fn fresh(&self, stale_time: Duration) -> Option<Arc<LookupTable>> {
        match self.state() {
            SlotState::Ready { table, fetched_at } if fetched_at.elapsed() < stale_time => Some(table),
            _ => None,
        }
    }
}

// ============================================================================
// CACHE
// ============================================================================

/// Shared cache over a `LookupRegistry`.
#[derive(Debug)]
pub struct LookupCache {
    registry: LookupRegistry,
    config: LookupConfig,
    slots: RwLock<HashMap<String, Arc<Slot>>>,
}

impl LookupCache {
    pub fn new(registry: LookupRegistry) -> Self {
        Self::with_config(registry, LookupConfig::default())
    }

    pub fn with_config(registry: LookupRegistry, config: LookupConfig) -> Self {
        LookupCache {
            registry,
            config,
            slots: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &LookupRegistry {
        &self.registry
    }

    fn slot(&self, key: &str) -> Arc<Slot> {
        if let Some(slot) = self.slots.read().unwrap_or_else(PoisonError::into_inner).get(key) {
            return slot.clone();
        }
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Slot::new()))
            .clone()
    }

    fn existing_slot(&self, key: &str) -> Option<Arc<Slot>> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Fetch (or reuse) the dataset for `key`.
    ///
    /// Concurrent callers share one request. A failure is reported to every
    /// caller that was already waiting for it; later calls retry.
    pub async fn resolve(&self, key: &str) -> Result<Arc<LookupTable>, LookupError> {
        let lookup = self
            .registry
            .get(key)
            .ok_or_else(|| LookupError::UnknownLookup(key.to_string()))?;
        let stale_time = self.config.stale_time();
        let slot = self.slot(key);

        if let Some(table) = slot.fresh(stale_time) {
            return Ok(table);
        }

        let requested_at = Instant::now();
        let _guard = slot.fetch_lock.lock().await;

        // Another caller may have finished while we waited
        match slot.state() {
            SlotState::Ready { table, fetched_at } if fetched_at >= requested_at || fetched_at.elapsed() < stale_time => {
                return Ok(table);
            }
            SlotState::Failed { message, failed_at } if failed_at >= requested_at => {
                return Err(LookupError::Fetch { key: key.to_string(), message });
            }
            _ => {}
        }

        let previous = match slot.state() {
            SlotState::Ready { table, .. } => Some(table),
            SlotState::Loading { previous } => previous,
            _ => None,
        };
        slot.set(SlotState::Loading { previous });
        log_debug!("LOOKUP", "fetching '{}'", key);

        match lookup.fetch().await {
            Ok(table) => {
                let table = Arc::new(table);
                log_debug!("LOOKUP", "fetched '{}' entries={}", key, table.len());
                slot.set(SlotState::Ready { table: table.clone(), fetched_at: Instant::now() });
                Ok(table)
            }
            Err(err) => {
                log_warn!("LOOKUP", "{}", err);
                let message = match &err {
                    LookupError::Fetch { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                slot.set(SlotState::Failed { message, failed_at: Instant::now() });
                Err(err)
            }
        }
    }

    /// Resolve several keys concurrently. Fails if any of them fails.
    pub async fn prefetch<'a, I>(&self, keys: I) -> Result<HashMap<String, Arc<LookupTable>>, LookupError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut unique: Vec<&str> = keys.into_iter().collect();
        unique.sort_unstable();
        unique.dedup();

        let tables = try_join_all(unique.iter().map(|key| self.resolve(key))).await?;
        Ok(unique
            .into_iter()
            .map(str::to_string)
            .zip(tables)
            .collect())
    }

    /// Drop the cached dataset so the next `resolve` fetches again.
    pub fn invalidate(&self, key: &str) {
        if let Some(slot) = self.existing_slot(key) {
            slot.set(SlotState::Idle);
        }
    }

    /// Synchronous snapshot for rendering.
    pub fn view(&self, key: &str) -> LookupView {
        if !self.registry.contains(key) {
            return LookupView::failed(format!("Unknown lookup: {}", key));
        }

        match self.existing_slot(key).map(|slot| slot.state()) {
            None | Some(SlotState::Idle) => LookupView::loading(None),
            Some(SlotState::Loading { previous }) => LookupView::loading(previous),
            Some(SlotState::Ready { table, .. }) => LookupView::ready(table),
            Some(SlotState::Failed { message, .. }) => LookupView::failed(message),
        }
    }
}

impl LookupSource for LookupCache {
    fn lookup(&self, key: &str) -> LookupState {
        let view = self.view(key);
        match view.table {
            Some(table) => LookupState::Ready(table),
            None if view.is_error => LookupState::Failed,
            None => LookupState::Loading,
        }
    }
}

// ============================================================================
// VIEW
// ============================================================================

/// What a consumer sees for one dataset: `{ data, options, getById, getLabel, isLoading, isError }`.
#[derive(Debug, Clone)]
pub struct LookupView {
    table: Option<Arc<LookupTable>>,
    pub is_loading: bool,
    pub is_error: bool,
    pub error: Option<String>,
}

impl LookupView {
    fn ready(table: Arc<LookupTable>) -> Self {
        LookupView { table: Some(table), is_loading: false, is_error: false, error: None }
    }

    fn loading(previous: Option<Arc<LookupTable>>) -> Self {
        LookupView { table: previous, is_loading: true, is_error: false, error: None }
    }

    fn failed(message: String) -> Self {
        LookupView { table: None, is_loading: false, is_error: true, error: Some(message) }
    }

    /// Label for an id; empty when the id is absent or nothing is loaded yet.
    /// Use `is_loading` to tell the two apart.
    pub fn get_label(&self, id: &str) -> String {
        self.table
            .as_ref()
            .and_then(|t| t.label(id))
            .unwrap_or_default()
            .to_string()
    }

    pub fn get_by_id<T: 'static>(&self, id: &str) -> Option<&T> {
        self.table.as_ref()?.get_by_id(id)
    }

    pub fn data<T: 'static>(&self) -> Option<&[T]> {
        self.table.as_ref()?.data()
    }

    pub fn options(&self) -> Vec<LookupOption> {
        self.table.as_ref().map(|t| t.options()).unwrap_or_default()
    }

    pub fn table(&self) -> Option<&Arc<LookupTable>> {
        self.table.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::LookupDefinition;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone)]
    struct Method {
        id: i64,
        name: &'static str,
    }

    fn registry(calls: Arc<AtomicUsize>, fail: bool) -> LookupRegistry {
        LookupRegistry::new().with(LookupDefinition::new(
            "payment-methods",
            move || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    if fail {
                        Err("server error".to_string())
                    } else {
                        Ok(vec![Method { id: 1, name: "מזומן" }, Method { id: 2, name: "אשראי" }])
                    }
                }
            },
            |m: &Method| m.id.into(),
            |m: &Method| m.name.to_string(),
        ))
    }

    #[tokio::test]
    async fn test_concurrent_resolves_share_one_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = LookupCache::new(registry(calls.clone(), false));

        let (a, b) = tokio::join!(cache.resolve("payment-methods"), cache.resolve("payment-methods"));
        assert_eq!(a.unwrap().label("1"), Some("מזומן"));
        assert_eq!(b.unwrap().label("2"), Some("אשראי"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.resolve("payment-methods").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_entries_are_refetched() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = LookupConfig::default().with_stale_time(Duration::ZERO);
        let cache = LookupCache::with_config(registry(calls.clone(), false), config);

        cache.resolve("payment-methods").await.unwrap();
        cache.resolve("payment-methods").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_view_states() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = LookupCache::new(registry(calls, false));

        let before = cache.view("payment-methods");
        assert!(before.is_loading);
        assert_eq!(before.get_label("1"), "");

        cache.resolve("payment-methods").await.unwrap();
        let after = cache.view("payment-methods");
        assert!(!after.is_loading);
        assert_eq!(after.get_label("1"), "מזומן");
        assert_eq!(after.get_label("99"), "");
        assert_eq!(after.options().len(), 2);
        assert_eq!(after.get_by_id::<Method>("2").map(|m| m.name), Some("אשראי"));

        assert!(cache.view("unknown").is_error);
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = LookupCache::new(registry(calls.clone(), true));

        let err = cache.resolve("payment-methods").await.unwrap_err();
        assert!(matches!(err, LookupError::Fetch { .. }));
        assert!(cache.view("payment-methods").is_error);
        assert!(matches!(cache.lookup("payment-methods"), LookupState::Failed));

        let _ = cache.resolve("payment-methods").await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let cache = LookupCache::new(LookupRegistry::new());
        assert_eq!(
            cache.resolve("cities").await.unwrap_err(),
            LookupError::UnknownLookup("cities".to_string())
        );
    }

    #[tokio::test]
    async fn test_prefetch_and_invalidate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = LookupCache::new(registry(calls.clone(), false));

        let tables = cache.prefetch(["payment-methods", "payment-methods"]).await.unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.invalidate("payment-methods");
        assert!(cache.view("payment-methods").is_loading);
        cache.resolve("payment-methods").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
