//! FILENAME: core/lookup/src/source.rs
//! PURPOSE: Synchronous read seam over resolved lookups.
//! CONTEXT: Cell rendering cannot await, so it asks a `LookupSource` for the
//! current state of a dataset. The live cache answers with whatever is
//! loaded so far; the export path answers from a pre-warmed snapshot.

use crate::table::LookupTable;
use std::sync::Arc;

/// Current state of one dataset as seen by a renderer.
#[derive(Debug, Clone)]
pub enum LookupState {
    Ready(Arc<LookupTable>),
    Loading,
    Failed,
}

pub trait LookupSource: Send + Sync {
    fn lookup(&self, key: &str) -> LookupState;
}

/// Source for tables that use no lookup columns. Every key reports failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookups;

impl LookupSource for NoLookups {
    fn lookup(&self, _key: &str) -> LookupState {
        LookupState::Failed
    }
}
