//! Guarded connection lifecycle.
//!
//! A single connection handle is shared by every worker and the
//! orchestrator. All access goes through one mutex so concurrent callers
//! never race to create two connections, and a forced drop is observed by
//! whichever caller reconnects next.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::errors::SearchError;
use crate::interfaces::{SearchConnector, SearchEngineClient};

/// Owns the shared search engine connection.
///
/// States: absent (no handle), open (handle stored), broken (a probe or
/// write failed; surfaced as a reconnect on the next [`ensure`] or an
/// explicit [`invalidate`]).
///
/// [`ensure`]: ConnectionManager::ensure
/// [`invalidate`]: ConnectionManager::invalidate
pub struct ConnectionManager {
    connector: Arc<dyn SearchConnector>,
    slot: Mutex<Option<Arc<dyn SearchEngineClient>>>,
}

impl ConnectionManager {
    /// Create a manager with no connection established yet.
    pub fn new(connector: Arc<dyn SearchConnector>) -> Self {
        Self {
            connector,
            slot: Mutex::new(None),
        }
    }

    /// Return a live connection, establishing or re-establishing one if
    /// needed.
    ///
    /// Idempotent: an existing handle that passes the liveness probe is
    /// returned as-is. A handle that fails the probe is dropped and replaced.
    /// Connectivity failures are not retried here; the caller decides.
    pub async fn ensure(&self) -> Result<Arc<dyn SearchEngineClient>, SearchError> {
        let mut slot = self.slot.lock().await;

        if let Some(client) = slot.as_ref() {
            match client.ping().await {
                Ok(true) => return Ok(Arc::clone(client)),
                Ok(false) => warn!("search engine connection lost, reconnecting"),
                Err(e) => warn!(error = %e, "liveness probe failed, reconnecting"),
            }
            *slot = None;
        }

        let client = self.connector.connect().await?;
        *slot = Some(Arc::clone(&client));
        Ok(client)
    }

    /// Force-drop the shared handle so the next [`ensure`] reconnects from
    /// scratch.
    ///
    /// [`ensure`]: ConnectionManager::ensure
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        if slot.take().is_some() {
            debug!("connection handle dropped, next attempt will reconnect");
        }
    }

    /// Release the connection. Safe to call when none exists; never fails.
    pub async fn close(&self) {
        let mut slot = self.slot.lock().await;
        if slot.take().is_some() {
            debug!("connection released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::interfaces::DocumentStream;
    use crate::types::BulkTotals;
    use reindexer_shared::{RangeBound, WriteAction};

    /// Mock client whose ping outcome is flipped from the outside.
    struct MockClient {
        healthy: Arc<AtomicBool>,
        pings: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SearchEngineClient for MockClient {
        async fn scan_all(&self) -> Result<DocumentStream, SearchError> {
            Ok(Box::pin(futures::stream::empty()))
        }

        async fn scan_range(
            &self,
            _gte: Option<&RangeBound>,
            _lte: Option<&RangeBound>,
        ) -> Result<DocumentStream, SearchError> {
            Ok(Box::pin(futures::stream::empty()))
        }

        async fn bulk_write(&self, _actions: &[WriteAction]) -> Result<BulkTotals, SearchError> {
            Ok(BulkTotals::default())
        }

        async fn ping(&self) -> Result<bool, SearchError> {
            self.pings.fetch_add(1, Ordering::SeqCst);
            Ok(self.healthy.load(Ordering::SeqCst))
        }
    }

    struct MockConnector {
        connects: Arc<AtomicUsize>,
        healthy: Arc<AtomicBool>,
        pings: Arc<AtomicUsize>,
        fail: Arc<AtomicBool>,
    }

    impl MockConnector {
        fn new() -> Self {
            Self {
                connects: Arc::new(AtomicUsize::new(0)),
                healthy: Arc::new(AtomicBool::new(true)),
                pings: Arc::new(AtomicUsize::new(0)),
                fail: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    #[async_trait]
    impl SearchConnector for MockConnector {
        async fn connect(&self) -> Result<Arc<dyn SearchEngineClient>, SearchError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(SearchError::connection("engine unreachable"));
            }
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(MockClient {
                healthy: Arc::clone(&self.healthy),
                pings: Arc::clone(&self.pings),
            }))
        }
    }

    #[tokio::test]
    async fn test_ensure_connects_once() {
        let connector = Arc::new(MockConnector::new());
        let connects = Arc::clone(&connector.connects);
        let manager = ConnectionManager::new(connector);

        manager.ensure().await.unwrap();
        manager.ensure().await.unwrap();
        manager.ensure().await.unwrap();

        assert_eq!(connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ensure_reconnects_after_failed_probe() {
        let connector = Arc::new(MockConnector::new());
        let connects = Arc::clone(&connector.connects);
        let healthy = Arc::clone(&connector.healthy);
        let manager = ConnectionManager::new(connector);

        manager.ensure().await.unwrap();
        healthy.store(false, Ordering::SeqCst);
        manager.ensure().await.unwrap();

        assert_eq!(connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_ensure_creates_single_connection() {
        let connector = Arc::new(MockConnector::new());
        let connects = Arc::clone(&connector.connects);
        let manager = Arc::new(ConnectionManager::new(connector));

        let (a, b) = tokio::join!(manager.ensure(), manager.ensure());
        a.unwrap();
        b.unwrap();

        assert_eq!(connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reconnect() {
        let connector = Arc::new(MockConnector::new());
        let connects = Arc::clone(&connector.connects);
        let manager = ConnectionManager::new(connector);

        manager.ensure().await.unwrap();
        manager.invalidate().await;
        manager.ensure().await.unwrap();

        assert_eq!(connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_close_without_connection_is_noop() {
        let connector = Arc::new(MockConnector::new());
        let manager = ConnectionManager::new(connector);

        manager.close().await;
        manager.close().await;
    }

    #[tokio::test]
    async fn test_connect_failure_propagates() {
        let connector = Arc::new(MockConnector::new());
        connector.fail.store(true, Ordering::SeqCst);
        let manager = ConnectionManager::new(connector);

        let err = match manager.ensure().await {
            Ok(_) => panic!("called `Result::unwrap_err()` on an `Ok` value"),
            Err(e) => e,
        };
        assert!(matches!(err, SearchError::ConnectionError(_)));
    }
}
