//! Grant and check counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a token's counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMetrics {
    /// Successful grants
    pub grants: u64,

    /// Grants rejected with a parse error
    pub rejected_grants: u64,

    /// Total checks, malformed ones included
    pub checks: u64,

    /// Checks that were allowed
    pub allowed: u64,

    /// Checks that were denied, malformed ones included
    pub denied: u64,

    /// Checks rejected because the query did not parse
    pub malformed_queries: u64,

    /// Checks answered from the decision cache
    pub cache_hits: u64,

    /// Checks that had to walk the tree
    pub cache_misses: u64,
}

impl TokenMetrics {
    /// Fraction of checks that were allowed
    pub fn allow_rate(&self) -> f64 {
        let total = self.allowed + self.denied;
        if total == 0 {
            0.0
        } else {
            self.allowed as f64 / total as f64
        }
    }

    /// Fraction of cache lookups that hit
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

/// Lock-free counter storage
#[derive(Debug, Default)]
pub struct MetricsCollector {
    grants: AtomicU64,
    rejected_grants: AtomicU64,
    checks: AtomicU64,
    allowed: AtomicU64,
    denied: AtomicU64,
    malformed_queries: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl MetricsCollector {
    /// Create a collector with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a grant attempt
    pub fn record_grant(&self, accepted: bool) {
        if accepted {
            self.grants.fetch_add(1, Ordering::Relaxed);
        } else {
            self.rejected_grants.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a check decision
    pub fn record_decision(&self, allowed: bool) {
        self.checks.fetch_add(1, Ordering::Relaxed);
        if allowed {
            self.allowed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.denied.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a query that failed to parse (counted as a denied check)
    pub fn record_malformed_query(&self) {
        self.malformed_queries.fetch_add(1, Ordering::Relaxed);
        self.record_decision(false);
    }

    /// Record a cache hit
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Current counter values
    pub fn snapshot(&self) -> TokenMetrics {
        TokenMetrics {
            grants: self.grants.load(Ordering::Relaxed),
            rejected_grants: self.rejected_grants.load(Ordering::Relaxed),
            checks: self.checks.load(Ordering::Relaxed),
            allowed: self.allowed.load(Ordering::Relaxed),
            denied: self.denied.load(Ordering::Relaxed),
            malformed_queries: self.malformed_queries.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }
}
