//! Committed dataset cache.
//!
//! [`CatalogCache`] holds one [`CommittedEntry`](crate::dataset::CommittedEntry)
//! per normalized dataset id and guarantees at most one priming fetch per id
//! at any time. Entries never expire on their own; callers drop them with
//! [`CatalogCache::invalidate`].

mod coordinator;
mod stats;

pub use coordinator::{CatalogCache, PrimingResult};
pub use stats::CoordinatorStats;
