//! FILENAME: core/lookup/src/lib.rs
//! Lookup resolution for reference datasets.
//!
//! Reference tables (currencies, payment methods, cities, projects, users)
//! are small and rarely change. Each one is described by a `LookupDefinition`,
//! fetched lazily the first time a consumer asks for it and then shared by
//! every consumer through one `LookupCache`.
//!
//! Layers:
//! - `definition`: how to fetch a dataset and read ids/labels from its items
//! - `table`: the resolved id -> label index for one dataset
//! - `cache`: deduplicated async fetching with a staleness window
//! - `source`: the synchronous read seam used by cell rendering and export

pub mod cache;
pub mod definition;
pub mod error;
pub mod source;
pub mod table;

pub use cache::{LookupCache, LookupConfig, LookupView};
pub use definition::{LookupDefinition, LookupRegistry};
pub use error::LookupError;
pub use source::{LookupSource, LookupState, NoLookups};
pub use table::{LookupEntry, LookupId, LookupOption, LookupTable};
