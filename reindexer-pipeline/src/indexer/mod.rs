//! Chunk indexer: retry/reconnect policy around mapping and bulk writes.
//!
//! Retries operate at chunk granularity. Each attempt gets a verified
//! connection; any failure force-drops the shared handle so the next
//! attempt reconnects from scratch, then backs off exponentially. A chunk
//! that exhausts its attempts is counted entirely as failed; no partial
//! credit is kept from earlier attempts.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::mapper::DocumentMapper;
use reindexer_repository::{BulkTotals, ConnectionManager, SearchError};
use reindexer_shared::SourceDocument;

/// Maps and bulk-writes one chunk at a time, with retry.
pub struct ChunkIndexer {
    connections: Arc<ConnectionManager>,
    mapper: DocumentMapper,
    max_retries: u32,
}

impl ChunkIndexer {
    /// Create an indexer allowing up to `max_retries` attempts per chunk.
    pub fn new(
        connections: Arc<ConnectionManager>,
        mapper: DocumentMapper,
        max_retries: u32,
    ) -> Self {
        Self {
            connections,
            mapper,
            max_retries: max_retries.max(1),
        }
    }

    /// Process one chunk to a final outcome.
    ///
    /// Never fails: exhausted retries are reported as `(0, chunk length)`.
    pub async fn process(&self, chunk: &[SourceDocument]) -> BulkTotals {
        let mut attempt = 0;

        while attempt < self.max_retries {
            match self.attempt(chunk).await {
                Ok(totals) => {
                    if attempt > 0 {
                        info!(attempt = attempt + 1, "chunk indexed after retry");
                    }
                    return totals;
                }
                Err(e) => {
                    attempt += 1;
                    error!(
                        attempt = attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "chunk attempt failed"
                    );

                    // Force a reconnect on the next attempt.
                    self.connections.invalidate().await;

                    if attempt < self.max_retries {
                        let delay = Duration::from_secs(1u64 << attempt);
                        debug!(delay_secs = delay.as_secs(), "backing off before retry");
                        sleep(delay).await;
                    }
                }
            }
        }

        error!(
            size = chunk.len(),
            "retries exhausted, counting whole chunk as failed"
        );
        BulkTotals::all_failed(chunk.len())
    }

    async fn attempt(&self, chunk: &[SourceDocument]) -> Result<BulkTotals, SearchError> {
        let client = self.connections.ensure().await?;

        let actions = self.mapper.map_chunk(chunk);
        if actions.is_empty() {
            warn!(
                size = chunk.len(),
                "chunk produced no write actions, counting it as failed"
            );
            return Ok(BulkTotals::all_failed(chunk.len()));
        }

        client.bulk_write(&actions).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    use reindexer_repository::{DocumentStream, SearchConnector, SearchEngineClient};
    use reindexer_shared::{DateFormat, RangeBound, TimeUnit, WriteAction};

    /// Client whose first `failures` bulk calls fail.
    struct FlakyClient {
        bulk_calls: Arc<AtomicUsize>,
        failures: usize,
    }

    #[async_trait]
    impl SearchEngineClient for FlakyClient {
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

        async fn bulk_write(&self, actions: &[WriteAction]) -> Result<BulkTotals, SearchError> {
            let call = self.bulk_calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(SearchError::bulk_write("engine unavailable"));
            }
            Ok(BulkTotals::new(actions.len() as u64, 0))
        }

        async fn ping(&self) -> Result<bool, SearchError> {
            Ok(true)
        }
    }

    struct FlakyConnector {
        connects: Arc<AtomicUsize>,
        bulk_calls: Arc<AtomicUsize>,
        failures: usize,
    }

    #[async_trait]
    impl SearchConnector for FlakyConnector {
        async fn connect(&self) -> Result<Arc<dyn SearchEngineClient>, SearchError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(FlakyClient {
                bulk_calls: Arc::clone(&self.bulk_calls),
                failures: self.failures,
            }))
        }
    }

    struct Fixture {
        indexer: ChunkIndexer,
        connects: Arc<AtomicUsize>,
        bulk_calls: Arc<AtomicUsize>,
    }

    fn fixture(bulk_failures: usize, max_retries: u32) -> Fixture {
        let connects = Arc::new(AtomicUsize::new(0));
        let bulk_calls = Arc::new(AtomicUsize::new(0));
        let connector = Arc::new(FlakyConnector {
            connects: Arc::clone(&connects),
            bulk_calls: Arc::clone(&bulk_calls),
            failures: bulk_failures,
        });
        let mapper = DocumentMapper::new(
            "created_at".to_string(),
            "logs".to_string(),
            DateFormat::YearMonth,
            TimeUnit::EpochSeconds,
            None,
        );
        let indexer = ChunkIndexer::new(
            Arc::new(ConnectionManager::new(connector)),
            mapper,
            max_retries,
        );

        Fixture {
            indexer,
            connects,
            bulk_calls,
        }
    }

    fn chunk(count: usize) -> Vec<SourceDocument> {
        (0..count)
            .map(|i| {
                SourceDocument::new(
                    format!("doc-{}", i),
                    json!({ "created_at": 1_705_276_800 }),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let fx = fixture(0, 3);

        let totals = fx.indexer.process(&chunk(4)).await;

        assert_eq!(totals, BulkTotals::new(4, 0));
        assert_eq!(fx.bulk_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fx.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_fail_whole_chunk_with_backoff() {
        let fx = fixture(usize::MAX, 3);
        let start = Instant::now();

        let totals = fx.indexer.process(&chunk(5)).await;

        assert_eq!(totals, BulkTotals::new(0, 5));
        // Exactly max_retries attempts, with 2^1 + 2^2 seconds of backoff.
        assert_eq!(fx.bulk_calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_forces_reconnect_and_only_final_attempt_counts() {
        let fx = fixture(1, 3);

        let totals = fx.indexer.process(&chunk(2)).await;

        assert_eq!(totals, BulkTotals::new(2, 0));
        assert_eq!(fx.bulk_calls.load(Ordering::SeqCst), 2);
        // Initial connect plus one reconnect after the invalidated handle.
        assert_eq!(fx.connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unmappable_chunk_reported_failed_without_bulk_write() {
        let fx = fixture(0, 3);
        let unmappable = vec![
            SourceDocument::new("a", json!({})),
            SourceDocument::new("b", json!({ "created_at": "not-a-number" })),
        ];

        let totals = fx.indexer.process(&unmappable).await;

        assert_eq!(totals, BulkTotals::new(0, 2));
        assert_eq!(fx.bulk_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_single_retry_budget_means_single_attempt() {
        let fx = fixture(usize::MAX, 1);

        let totals = fx.indexer.process(&chunk(3)).await;

        assert_eq!(totals, BulkTotals::new(0, 3));
        assert_eq!(fx.bulk_calls.load(Ordering::SeqCst), 1);
    }
}
