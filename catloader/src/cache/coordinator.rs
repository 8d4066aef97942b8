//! Single-flight committed cache.
//!
//! Every caller that needs a dataset's base entry goes through
//! [`CatalogCache::ensure_loaded`]. For each normalized id at most one priming
//! fetch (descriptor + first page) is ever outstanding; concurrent callers
//! join it and receive the same result.
//!
//! ```text
//! caller A ─┐
//!           │                      spawned priming task
//! caller B ─┼──► CatalogCache ───► descriptor + page 1
//!           │        │                     │
//! caller C ─┘        │                     ▼
//!                    ▼              Committed / removed
//!              [A, B, C all  ◄──── broadcast result
//!               receive same]
//! ```
//!
//! # Slot table
//!
//! One map from normalized id to `Slot`. A key is either in flight or
//! committed, never both. The map is guarded by a synchronous mutex that is
//! only taken in the register and complete sections and never held across an
//! await point.

use super::stats::{CoordinatorCounters, CoordinatorStats};
use crate::dataset::{CommittedEntry, DatasetId};
use crate::query::PageRequest;
use crate::remote::{CatalogSource, FetchError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Outcome of one priming fetch, shared by every joiner.
pub type PrimingResult = Result<Arc<CommittedEntry>, FetchError>;

enum Slot {
    InFlight(broadcast::Sender<PrimingResult>),
    Committed(Arc<CommittedEntry>),
}

type SlotTable = Arc<Mutex<HashMap<DatasetId, Slot>>>;

/// What `ensure_loaded` decided under the lock.
enum Registration {
    Hit(Arc<CommittedEntry>),
    Joined(broadcast::Receiver<PrimingResult>),
    Started(
        broadcast::Sender<PrimingResult>,
        broadcast::Receiver<PrimingResult>,
    ),
}

/// Committed-entry cache with request coalescing.
///
/// Cloning is cheap; clones share the same table and source.
pub struct CatalogCache<S> {
    source: Arc<S>,
    slots: SlotTable,
    counters: Arc<CoordinatorCounters>,
}

impl<S> Clone for CatalogCache<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            slots: Arc::clone(&self.slots),
            counters: Arc::clone(&self.counters),
        }
    }
}

impl<S: CatalogSource> CatalogCache<S> {
    /// Creates an empty cache over `source`.
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            slots: Arc::new(Mutex::new(HashMap::new())),
            counters: Arc::new(CoordinatorCounters::default()),
        }
    }

    /// The underlying catalog source.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Returns the committed entry for `id`, priming it if necessary.
    ///
    /// - committed: returned immediately, no network
    /// - in flight: waits for the running fetch
    /// - otherwise: registers a new fetch and waits for it
    ///
    /// A failed fetch commits nothing and is not retried; every caller that
    /// joined it receives the same error. The fetch runs on its own task, so
    /// dropping this future does not abandon other joiners.
    pub async fn ensure_loaded(&self, id: &str) -> PrimingResult {
        let key = DatasetId::new(id);
        self.counters.record_request();

        let registration = {
            let mut slots = self.slots.lock();
            match slots.get(&key) {
                Some(Slot::Committed(entry)) => Registration::Hit(Arc::clone(entry)),
                Some(Slot::InFlight(tx)) => Registration::Joined(tx.subscribe()),
                None => {
                    let (tx, rx) = broadcast::channel(1);
                    slots.insert(key.clone(), Slot::InFlight(tx.clone()));
                    Registration::Started(tx, rx)
                }
            }
        };

        let mut rx = match registration {
            Registration::Hit(entry) => {
                self.counters.record_hit();
                debug!(dataset = %key, "Committed cache hit");
                return Ok(entry);
            }
            Registration::Joined(rx) => {
                self.counters.record_coalesced();
                debug!(dataset = %key, "Joining in-flight priming fetch");
                rx
            }
            Registration::Started(tx, rx) => {
                self.counters.record_priming();
                info!(dataset = %key, "Priming dataset");
                self.spawn_priming(key.clone(), tx);
                rx
            }
        };

        match rx.recv().await {
            Ok(result) => result,
            Err(_) => {
                warn!(dataset = %key, "Priming fetch ended without a result");
                Err(FetchError::Interrupted)
            }
        }
    }

    fn spawn_priming(&self, key: DatasetId, tx: broadcast::Sender<PrimingResult>) {
        let source = Arc::clone(&self.source);
        let slots = Arc::clone(&self.slots);
        let counters = Arc::clone(&self.counters);

        tokio::spawn(async move {
            let mut guard = InFlightGuard {
                slots: Arc::clone(&slots),
                key: key.clone(),
                settled: false,
            };

            let result = prime(source.as_ref(), &key).await.map(Arc::new);

            {
                let mut slots = slots.lock();
                match &result {
                    Ok(entry) => {
                        slots.insert(key.clone(), Slot::Committed(Arc::clone(entry)));
                    }
                    Err(_) => {
                        slots.remove(&key);
                    }
                }
            }
            guard.settled = true;

            match &result {
                Ok(entry) => info!(
                    dataset = %key,
                    rows = entry.records.len(),
                    total_rows = entry.total_rows,
                    columns = entry.columns.len(),
                    "Dataset committed"
                ),
                Err(e) => {
                    counters.record_failure();
                    warn!(dataset = %key, error = %e, "Priming fetch failed");
                }
            }

            let waiters = tx.receiver_count();
            let _ = tx.send(result);
            debug!(dataset = %key, waiters, "Broadcast priming result");
        });
    }

    /// Returns the committed entry for `id` without touching the network.
    pub fn cached(&self, id: &str) -> Option<Arc<CommittedEntry>> {
        match self.slots.lock().get(&DatasetId::new(id)) {
            Some(Slot::Committed(entry)) => Some(Arc::clone(entry)),
            _ => None,
        }
    }

    /// True if a priming fetch for `id` is running.
    pub fn is_loading(&self, id: &str) -> bool {
        matches!(
            self.slots.lock().get(&DatasetId::new(id)),
            Some(Slot::InFlight(_))
        )
    }

    /// Drops the committed entry for `id` so the next call primes again.
    ///
    /// An in-flight fetch is left alone. Returns true if an entry was removed.
    pub fn invalidate(&self, id: &str) -> bool {
        let key = DatasetId::new(id);
        let mut slots = self.slots.lock();
        if matches!(slots.get(&key), Some(Slot::Committed(_))) {
            slots.remove(&key);
            debug!(dataset = %key, "Committed entry invalidated");
            true
        } else {
            false
        }
    }

    /// Returns a snapshot of the current statistics.
    pub fn stats(&self) -> CoordinatorStats {
        let (committed, in_flight) = {
            let slots = self.slots.lock();
            let committed = slots
                .values()
                .filter(|s| matches!(s, Slot::Committed(_)))
                .count();
            (committed, slots.len() - committed)
        };
        self.counters.snapshot(committed, in_flight)
    }

    /// Logs current statistics.
    pub fn log_stats(&self) {
        let stats = self.stats();
        info!(
            requests = stats.requests,
            cache_hits = stats.cache_hits,
            coalesced = stats.coalesced,
            priming_fetches = stats.priming_fetches,
            failures = stats.failures,
            committed = stats.committed,
            in_flight = stats.in_flight,
            hit_rate = format!("{:.1}%", stats.hit_rate() * 100.0),
            "Catalog cache statistics"
        );
    }
}

/// Descriptor fetch followed by the fixed first page.
async fn prime<S: CatalogSource>(
    source: &S,
    key: &DatasetId,
) -> Result<CommittedEntry, FetchError> {
    let descriptor = source.fetch_descriptor(key).await?;
    let page = source.fetch_page(key, &PageRequest::priming(), None).await?;
    Ok(CommittedEntry::from_fetch(
        descriptor,
        page.rows,
        page.pagination.total_items,
    ))
}

/// Clears a stale in-flight slot if the priming task dies before settling.
///
/// The sender is dropped along with the task, so joiners observe a closed
/// channel.
struct InFlightGuard {
    slots: SlotTable,
    key: DatasetId,
    settled: bool,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut slots = self.slots.lock();
        if matches!(slots.get(&self.key), Some(Slot::InFlight(_))) {
            slots.remove(&self.key);
            warn!(dataset = %self.key, "Priming task aborted, in-flight slot cleared");
        }
    }
}
