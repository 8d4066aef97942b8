//! The dataset the surrounding application currently considers active.

use crate::dataset::{DatasetDescriptor, DatasetId, Record};
use parking_lot::RwLock;
use std::sync::Arc;

/// An already-decoded dataset held by the application.
///
/// The records may carry extra per-row fields computed elsewhere in the
/// application, so they can be richer than what the remote serves. They are
/// shared with every entry resolved from this dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDataset {
    pub id: DatasetId,
    pub records: Arc<Vec<Record>>,
    pub descriptor: Option<DatasetDescriptor>,
}

impl ActiveDataset {
    pub fn new(id: &str, records: impl Into<Arc<Vec<Record>>>) -> Self {
        Self {
            id: DatasetId::new(id),
            records: records.into(),
            descriptor: None,
        }
    }

    pub fn with_descriptor(mut self, descriptor: DatasetDescriptor) -> Self {
        self.descriptor = Some(descriptor);
        self
    }
}

/// Provides the currently active dataset, if any.
pub trait ActiveDatasetSource: Send + Sync + 'static {
    fn active(&self) -> Option<Arc<ActiveDataset>>;
}

/// Shared slot the application writes its active dataset into.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct SharedActiveDataset {
    inner: Arc<RwLock<Option<Arc<ActiveDataset>>>>,
}

impl SharedActiveDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the active dataset.
    pub fn set(&self, dataset: ActiveDataset) {
        *self.inner.write() = Some(Arc::new(dataset));
    }

    /// Clears the active dataset.
    pub fn clear(&self) {
        *self.inner.write() = None;
    }
}

impl ActiveDatasetSource for SharedActiveDataset {
    fn active(&self) -> Option<Arc<ActiveDataset>> {
        self.inner.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_slot_is_visible_through_clones() {
        let shared = SharedActiveDataset::new();
        let reader = shared.clone();
        assert!(reader.active().is_none());

        shared.set(ActiveDataset::new("catalogs/a", vec![Record::new().with("id", 1i64)]));
        let active = reader.active().unwrap();
        assert_eq!(active.id.as_str(), "a");

        shared.clear();
        assert!(reader.active().is_none());
    }
}
