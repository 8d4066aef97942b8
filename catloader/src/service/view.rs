//! What a viewer renders.

use crate::dataset::{DatasetDescriptor, DatasetId, Record};
use crate::query::PageResult;
use serde::Serialize;
use std::fmt;

/// Where the rows of a view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewSource {
    /// Application's in-memory dataset
    LocalOverride,
    /// Committed cache entry
    Cache,
    /// Page endpoint round-trip
    Remote,
}

impl fmt::Display for ViewSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalOverride => write!(f, "local override"),
            Self::Cache => write!(f, "cache"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// One page of a dataset together with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogView {
    pub dataset: DatasetId,
    /// Columns to display, in order
    pub columns: Vec<String>,
    pub descriptor: DatasetDescriptor,
    pub total_rows: u64,
    /// Page number this view was loaded for (1-based)
    pub page_number: u32,
    pub page: PageResult,
    pub source: ViewSource,
}

impl CatalogView {
    pub fn rows(&self) -> &[Record] {
        &self.page.rows
    }
}
