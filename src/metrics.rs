use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Trait for tracking evaluation-time statistics.
///
/// Implementations collect counters about membership-cache effectiveness,
/// degree lookups and the strategy chosen by expand-into. The information is
/// meant for profiling; no evaluation result depends on it.
pub trait EvalMetrics: Send + Sync {
    /// Records a membership-cache lookup.
    ///
    /// # Parameters
    /// * `hit` - Whether the list already had an entry.
    fn in_cache_lookup(&self, hit: bool);

    /// Records the eviction of a membership-cache entry.
    fn in_cache_eviction(&self);

    /// Records a degree lookup.
    ///
    /// # Parameters
    /// * `dense` - Whether the degree came from precomputed counts (`true`) or a scan.
    fn degree_query(&self, dense: bool);

    /// Records the strategy chosen by expand-into.
    ///
    /// # Parameters
    /// * `strategy` - One of `"empty"`, `"from"`, or `"to"`.
    fn expand_into(&self, strategy: &'static str);
}

/// A no-op implementation of [`EvalMetrics`] that discards all recorded metrics.
#[derive(Default)]
pub struct NoopMetrics;

impl EvalMetrics for NoopMetrics {
    fn in_cache_lookup(&self, _hit: bool) {}
    fn in_cache_eviction(&self) {}
    fn degree_query(&self, _dense: bool) {}
    fn expand_into(&self, _strategy: &'static str) {}
}

/// A thread-safe counter-based implementation of [`EvalMetrics`].
#[derive(Default)]
pub struct CounterMetrics {
    /// Membership lookups that found an existing entry for their list.
    pub in_cache_hits: AtomicU64,

    /// Membership lookups that had to create an entry.
    pub in_cache_misses: AtomicU64,

    /// Membership-cache entries evicted by the LRU policy.
    pub in_cache_evictions: AtomicU64,

    /// Degree lookups served from dense counts.
    pub degree_dense: AtomicU64,

    /// Degree lookups that required scanning relationships.
    pub degree_scanned: AtomicU64,

    /// Expand-into calls short-circuited on a zero degree.
    pub expand_empty: AtomicU64,

    /// Expand-into calls that iterated from the start node.
    pub expand_from: AtomicU64,

    /// Expand-into calls that iterated from the end node.
    pub expand_to: AtomicU64,
}

impl EvalMetrics for CounterMetrics {
    fn in_cache_lookup(&self, hit: bool) {
        if hit {
            self.in_cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.in_cache_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn in_cache_eviction(&self) {
        self.in_cache_evictions.fetch_add(1, Ordering::Relaxed);
    }

    fn degree_query(&self, dense: bool) {
        if dense {
            self.degree_dense.fetch_add(1, Ordering::Relaxed);
        } else {
            self.degree_scanned.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn expand_into(&self, strategy: &'static str) {
        match strategy {
            "empty" => {
                self.expand_empty.fetch_add(1, Ordering::Relaxed);
            }
            "from" => {
                self.expand_from.fetch_add(1, Ordering::Relaxed);
            }
            "to" => {
                self.expand_to.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }
}

/// Returns the default metrics implementation wrapped in an [`Arc`].
pub fn default_metrics() -> Arc<dyn EvalMetrics> {
    Arc::new(NoopMetrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_follow_recorded_events() {
        let metrics = CounterMetrics::default();
        metrics.in_cache_lookup(true);
        metrics.in_cache_lookup(false);
        metrics.in_cache_lookup(false);
        metrics.in_cache_eviction();
        metrics.degree_query(true);
        metrics.expand_into("to");
        metrics.expand_into("unknown");
        assert_eq!(metrics.in_cache_hits.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.in_cache_misses.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.in_cache_evictions.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.degree_dense.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.degree_scanned.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.expand_to.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.expand_from.load(Ordering::Relaxed), 0);
    }
}
