//! Cache-aside fetch orchestrator
//!
//! Every inbound request goes through [`CacheProxy::handle`]: serve the
//! persisted snapshot while it is fresh, otherwise refresh from upstream and
//! persist the result. The freshness window is a pure time predicate, so
//! correctness does not depend on any background task running.

use chrono::Duration;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::AppError;
use crate::nyt::BestsellerSource;
use crate::store::SnapshotStore;

/// Cache-aside orchestrator in front of the upstream bestseller API.
///
/// The store and source are injected so tests can substitute doubles.
pub struct CacheProxy {
    store: Arc<dyn SnapshotStore>,
    source: Arc<dyn BestsellerSource>,
    freshness: Duration,
    /// Single-flight guard: at most one refresh runs at a time; concurrent
    /// stale readers wait on it and re-check the store instead of issuing
    /// redundant upstream calls.
    refresh_lock: Mutex<()>,
}

impl CacheProxy {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        source: Arc<dyn BestsellerSource>,
        freshness: Duration,
    ) -> Self {
        Self {
            store,
            source,
            freshness,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Serve the current payload: the persisted snapshot if fresh, otherwise
    /// a freshly fetched and persisted one.
    ///
    /// Upstream failures are returned as-is; no implicit fallback to stale
    /// data, and nothing is inserted. Retrying is the caller's decision.
    pub async fn handle(&self) -> Result<String, AppError> {
        if let Some(snapshot) = self.store.latest().await? {
            if snapshot.is_fresh(self.freshness) {
                debug!(fetched_at = %snapshot.fetched_at, "Serving cached snapshot");
                return Ok(snapshot.content);
            }
            debug!(fetched_at = %snapshot.fetched_at, "Snapshot is stale");
        }

        self.refresh().await
    }

    async fn refresh(&self) -> Result<String, AppError> {
        let _guard = self.refresh_lock.lock().await;

        // A concurrent request may have refreshed while we waited for the
        // lock; serve its result instead of hitting upstream again.
        if let Some(snapshot) = self.store.latest().await? {
            if snapshot.is_fresh(self.freshness) {
                debug!("Refresh already completed by a concurrent request");
                return Ok(snapshot.content);
            }
        }

        let body = self.source.fetch_overview().await?;
        let snapshot = self.store.insert(&body).await?;
        info!(fetched_at = %snapshot.fetched_at, bytes = snapshot.content.len(), "Stored bestseller snapshot");

        Ok(snapshot.content)
    }
}
