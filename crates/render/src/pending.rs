//! Pending-Value Bridge
//!
//! Deferred subtree computations registered under opaque identifiers,
//! retrievable exactly once. A "resolve this deferred value" request from
//! the receiving side lands here with nothing but the id.
//!
//! Design:
//! 1. The computation runs on the runtime as soon as it is registered -
//!    resolution latency is await-only, not compute-on-demand
//! 2. Request/value matching via id; `DashMap::remove` makes the
//!    retrieve-and-retire step atomic, so concurrent resolvers racing on
//!    one id observe at most one success
//! 3. No retries, no broadcast. Single-resolution semantics.

use dashmap::DashMap;
use element::WireValue;
use futures_util::future::BoxFuture;
use tokio::sync::oneshot;

use crate::error::{RenderError, Result};

/// Table of in-flight deferred values, keyed by opaque identifier.
#[derive(Default)]
pub struct PendingValues {
    entries: DashMap<String, oneshot::Receiver<WireValue>>,
}

impl PendingValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a computation under `id` and start it.
    ///
    /// At most one live entry per identifier: registering an id that is
    /// already live replaces the old entry (its value is dropped).
    pub fn create(&self, id: impl Into<String>, computation: BoxFuture<'static, WireValue>) {
        let id = id.into();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let value = computation.await;
            // Receiver gone means the session ended first; nothing to do.
            let _ = tx.send(value);
        });

        if self.entries.insert(id.clone(), rx).is_some() {
            tracing::warn!(pending = %id, "replaced live pending entry");
        }
        tracing::debug!(pending = %id, "pending value registered");
    }

    /// Retrieve and retire the entry for `id`, awaiting its completion.
    ///
    /// Fails with `PendingNotFound` when the id was never registered,
    /// already resolved, or reaped at session end.
    pub async fn resolve_and_remove(&self, id: &str) -> Result<WireValue> {
        let (_, rx) = self
            .entries
            .remove(id)
            .ok_or_else(|| RenderError::PendingNotFound(id.to_string()))?;

        rx.await
            .map_err(|_| RenderError::PendingAbandoned(id.to_string()))
    }

    /// Drop all entries. Called at session teardown so orphaned values are
    /// not retained past their session.
    pub fn clear(&self) {
        let dropped = self.entries.len();
        self.entries.clear();
        if dropped > 0 {
            tracing::debug!(dropped, "cleared pending values");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_single_resolution() {
        let pending = PendingValues::new();
        pending.create("p1", Box::pin(async { json!("value") }));

        let first = pending.resolve_and_remove("p1").await.unwrap();
        assert_eq!(first, json!("value"));

        let second = pending.resolve_and_remove("p1").await;
        assert!(matches!(second, Err(RenderError::PendingNotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_id_not_found() {
        let pending = PendingValues::new();
        let result = pending.resolve_and_remove("nope").await;
        assert!(matches!(result, Err(RenderError::PendingNotFound(_))));
    }

    #[tokio::test]
    async fn test_concurrent_resolvers_one_winner() {
        let pending = Arc::new(PendingValues::new());
        pending.create(
            "contested",
            Box::pin(async {
                tokio::task::yield_now().await;
                json!(42)
            }),
        );

        let mut handles = Vec::new();
        for _ in 0..4 {
            let pending = pending.clone();
            handles.push(tokio::spawn(async move {
                pending.resolve_and_remove("contested").await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_clear_reaps_orphans() {
        let pending = PendingValues::new();
        pending.create("orphan", Box::pin(async { json!(null) }));
        assert_eq!(pending.len(), 1);

        pending.clear();
        assert!(pending.is_empty());

        let result = pending.resolve_and_remove("orphan").await;
        assert!(matches!(result, Err(RenderError::PendingNotFound(_))));
    }

    #[tokio::test]
    async fn test_reregistration_replaces_entry() {
        let pending = PendingValues::new();
        pending.create("p", Box::pin(async { json!("old") }));
        pending.create("p", Box::pin(async { json!("new") }));
        assert_eq!(pending.len(), 1);

        let value = pending.resolve_and_remove("p").await.unwrap();
        assert_eq!(value, json!("new"));
    }
}
