//! Execution counters
//!
//! Counters are atomics so one [`QueryMetrics`] can be shared across
//! concurrent executions behind an `Arc`.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct QueryMetrics {
    cache_hits: AtomicU64,
    live_queries: AtomicU64,
    query_time_nanos: AtomicU64,
    rows: AtomicU64,
}

/// Point-in-time copy of [`QueryMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Results served without reaching the driver
    pub cache_hits: u64,
    /// Statements sent to the driver
    pub live_queries: u64,
    /// Cumulative driver time
    pub query_time: Duration,
    /// Cumulative rows returned
    pub rows: u64,
}

impl QueryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a result served from a caller-side cache
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one driver round trip
    pub fn record_query(&self, elapsed: Duration, rows: usize) {
        self.live_queries.fetch_add(1, Ordering::Relaxed);
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.query_time_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.rows.fetch_add(rows as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            live_queries: self.live_queries.load(Ordering::Relaxed),
            query_time: Duration::from_nanos(self.query_time_nanos.load(Ordering::Relaxed)),
            rows: self.rows.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.cache_hits.store(0, Ordering::Relaxed);
        self.live_queries.store(0, Ordering::Relaxed);
        self.query_time_nanos.store(0, Ordering::Relaxed);
        self.rows.store(0, Ordering::Relaxed);
    }
}
