//! Local override resolution.

use super::active::ActiveDatasetSource;
use crate::dataset::{CommittedEntry, DatasetDescriptor, DatasetId};
use std::sync::Arc;
use tracing::debug;

/// Serves a dataset from the application's in-memory copy when it matches.
pub struct LocalOverride<A> {
    active: A,
}

impl<A: ActiveDatasetSource> LocalOverride<A> {
    pub fn new(active: A) -> Self {
        Self { active }
    }

    /// Synthesizes an entry from the active dataset if it is `id`.
    ///
    /// Returns `None` when no dataset is active, when the active dataset is a
    /// different one, or when it has no decoded records. The result is never
    /// written to the committed cache.
    pub fn try_resolve(&self, id: &str) -> Option<CommittedEntry> {
        let active = self.active.active()?;
        let key = DatasetId::new(id);
        if active.id != key || active.records.is_empty() {
            return None;
        }

        let descriptor = active
            .descriptor
            .clone()
            .unwrap_or_else(|| DatasetDescriptor::from_records(&active.records));
        debug!(
            dataset = %key,
            rows = active.records.len(),
            "Serving dataset from local override"
        );
        Some(CommittedEntry::from_fetch(
            descriptor,
            Arc::clone(&active.records),
            active.records.len() as u64,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{ColumnMeta, Record};
    use crate::local::{ActiveDataset, SharedActiveDataset};

    fn flagged_rows(n: i64) -> Vec<Record> {
        (0..n)
            .map(|i| Record::new().with("id", i).with("selected", i % 2 == 0))
            .collect()
    }

    #[test]
    fn test_no_active_dataset() {
        let resolver = LocalOverride::new(SharedActiveDataset::new());
        assert!(resolver.try_resolve("a").is_none());
    }

    #[test]
    fn test_matching_id_across_spellings() {
        let shared = SharedActiveDataset::new();
        shared.set(ActiveDataset::new("a.fits", flagged_rows(4)));
        let resolver = LocalOverride::new(shared);

        let entry = resolver.try_resolve("catalogs/a.fits").unwrap();
        assert_eq!(entry.records.len(), 4);
        assert_eq!(entry.columns, vec!["id", "selected"]);
        assert_eq!(entry.total_rows, 4);
    }

    #[test]
    fn test_entry_shares_active_records() {
        let shared = SharedActiveDataset::new();
        shared.set(ActiveDataset::new("a.fits", flagged_rows(1_000)));
        let active = shared.active().unwrap();
        let resolver = LocalOverride::new(shared);

        let first = resolver.try_resolve("a.fits").unwrap();
        let second = resolver.try_resolve("a.fits").unwrap();
        assert!(Arc::ptr_eq(&first.records, &active.records));
        assert!(Arc::ptr_eq(&second.records, &active.records));
    }

    #[test]
    fn test_different_dataset_falls_through() {
        let shared = SharedActiveDataset::new();
        shared.set(ActiveDataset::new("a.fits", flagged_rows(4)));
        let resolver = LocalOverride::new(shared);

        assert!(resolver.try_resolve("b.fits").is_none());
    }

    #[test]
    fn test_empty_records_fall_through() {
        let shared = SharedActiveDataset::new();
        shared.set(ActiveDataset::new("a.fits", Vec::<Record>::new()));
        let resolver = LocalOverride::new(shared);

        assert!(resolver.try_resolve("a.fits").is_none());
    }

    #[test]
    fn test_supplied_descriptor_is_used() {
        let shared = SharedActiveDataset::new();
        shared.set(
            ActiveDataset::new("a.fits", flagged_rows(2)).with_descriptor(DatasetDescriptor::new(
                90_000,
                vec![ColumnMeta::new("id", "int64")],
            )),
        );
        let resolver = LocalOverride::new(shared);

        let entry = resolver.try_resolve("a.fits").unwrap();
        assert_eq!(entry.total_rows, 90_000);
        assert_eq!(entry.columns, vec!["id"]);
    }
}
