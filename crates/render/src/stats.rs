//! Render Statistics
//!
//! Process-wide, monotonically non-decreasing counters. Informational
//! only - nothing here participates in correctness, so everything is
//! lock-free atomics plus a DashMap for the per-component tallies.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;

#[derive(Default)]
pub struct RenderStats {
    total: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    /// Contained per-node render failures (substituted error nodes).
    failed_nodes: AtomicU64,
    boundary_resolutions: AtomicU64,
    invocations: DashMap<String, u64>,
}

impl RenderStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_render(&self, ok: bool) {
        self.total.fetch_add(1, Ordering::SeqCst);
        if ok {
            self.succeeded.fetch_add(1, Ordering::SeqCst);
        } else {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn record_failed_node(&self) {
        self.failed_nodes.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_boundary_resolution(&self) {
        self.boundary_resolutions.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_invocation(&self, component: &str) {
        *self.invocations.entry(component.to_string()).or_insert(0) += 1;
    }

    pub fn invocation_count(&self, component: &str) -> u64 {
        self.invocations.get(component).map(|c| *c).unwrap_or(0)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total: self.total.load(Ordering::SeqCst),
            succeeded: self.succeeded.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            failed_nodes: self.failed_nodes.load(Ordering::SeqCst),
            boundary_resolutions: self.boundary_resolutions.load(Ordering::SeqCst),
            invocations: self
                .invocations
                .iter()
                .map(|e| (e.key().clone(), *e.value()))
                .collect(),
        }
    }
}

/// Point-in-time view of the counters.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub failed_nodes: u64,
    pub boundary_resolutions: u64,
    pub invocations: HashMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = RenderStats::new();
        stats.record_render(true);
        stats.record_render(true);
        stats.record_render(false);
        stats.record_failed_node();
        stats.record_boundary_resolution();
        stats.record_invocation("Home");
        stats.record_invocation("Home");
        stats.record_invocation("Sidebar");

        let snap = stats.snapshot();
        assert_eq!(snap.total, 3);
        assert_eq!(snap.succeeded, 2);
        assert_eq!(snap.failed, 1);
        assert_eq!(snap.failed_nodes, 1);
        assert_eq!(snap.boundary_resolutions, 1);
        assert_eq!(snap.invocations["Home"], 2);
        assert_eq!(snap.invocations["Sidebar"], 1);
        assert_eq!(stats.invocation_count("Home"), 2);
        assert_eq!(stats.invocation_count("missing"), 0);
    }
}
