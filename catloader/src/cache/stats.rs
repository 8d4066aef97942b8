//! Coordinator statistics tracking.

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters updated on every `ensure_loaded` call.
#[derive(Debug, Default)]
pub(crate) struct CoordinatorCounters {
    requests: AtomicU64,
    cache_hits: AtomicU64,
    coalesced: AtomicU64,
    priming_fetches: AtomicU64,
    failures: AtomicU64,
}

impl CoordinatorCounters {
    pub(crate) fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_priming(&self) {
        self.priming_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, committed: usize, in_flight: usize) -> CoordinatorStats {
        CoordinatorStats {
            requests: self.requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            priming_fetches: self.priming_fetches.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            committed,
            in_flight,
        }
    }
}

/// Snapshot of coordinator activity for monitoring.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Total `ensure_loaded` calls
    pub requests: u64,
    /// Calls answered from a committed entry
    pub cache_hits: u64,
    /// Calls that joined an in-flight priming fetch
    pub coalesced: u64,
    /// Priming fetches started
    pub priming_fetches: u64,
    /// Priming fetches that failed
    pub failures: u64,
    /// Committed entries currently held
    pub committed: usize,
    /// Priming fetches currently running
    pub in_flight: usize,
}

impl CoordinatorStats {
    /// Fraction of requests served without starting a fetch (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            (self.cache_hits + self.coalesced) as f64 / self.requests as f64
        }
    }

    /// Formats the statistics as a human-readable report.
    pub fn format(&self) -> String {
        format!(
            r#"Catalog Cache Statistics

REQUESTS
  Total:       {}
  Hits:        {}
  Coalesced:   {}
  Hit Rate:    {:.1}%

PRIMING
  Fetches:     {}
  Failures:    {}
  In Flight:   {}

ENTRIES
  Committed:   {}
"#,
            self.requests,
            self.cache_hits,
            self.coalesced,
            self.hit_rate() * 100.0,
            self.priming_fetches,
            self.failures,
            self.in_flight,
            self.committed,
        )
    }
}
