//! Engine counters
//!
//! - Counters only
//! - Monotonic increase
//! - Exact values

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for one partition
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    nodes_created: AtomicU64,
    mutations_applied: AtomicU64,
    mutations_rejected: AtomicU64,
    events_published: AtomicU64,
    detachments: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_nodes_created(&self) {
        self.nodes_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_mutations_applied(&self) {
        self.mutations_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_mutations_rejected(&self) {
        self.mutations_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_events_published(&self, count: u64) {
        self.events_published.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_detachments(&self) {
        self.detachments.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            nodes_created: self.nodes_created.load(Ordering::Relaxed),
            mutations_applied: self.mutations_applied.load(Ordering::Relaxed),
            mutations_rejected: self.mutations_rejected.load(Ordering::Relaxed),
            events_published: self.events_published.load(Ordering::Relaxed),
            detachments: self.detachments.load(Ordering::Relaxed),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A point-in-time snapshot of all counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub nodes_created: u64,
    pub mutations_applied: u64,
    pub mutations_rejected: u64,
    pub events_published: u64,
    pub detachments: u64,
}
