//! Dataset identity and decoded catalog data.
//!
//! - [`normalize`] / [`DatasetId`] - canonical cache keys
//! - [`Record`], [`Value`] - decoded rows
//! - [`DatasetDescriptor`], [`ColumnMeta`] - dataset-level metadata
//! - [`CommittedEntry`] - what the cache stores and hands out

mod id;
mod types;

pub use id::{equivalent, normalize, DatasetId, STORAGE_PREFIX};
pub use types::{ColumnMeta, CommittedEntry, DatasetDescriptor, Record, Value};
