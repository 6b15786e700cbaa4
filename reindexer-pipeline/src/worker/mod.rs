//! Worker pool and run counters.
//!
//! Each worker loops over the hand-off queue: chunks are mapped and
//! bulk-written through the [`ChunkIndexer`], shutdown sentinels end the
//! loop. Totals are accumulated atomically, so completion order across
//! workers does not matter.
//!
//! [`ChunkIndexer`]: crate::indexer::ChunkIndexer

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::cancel::CancelFlag;
use crate::indexer::ChunkIndexer;
use crate::queue::{ChunkQueue, QueueItem};
use reindexer_repository::BulkTotals;

/// Final totals of a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    /// Documents written successfully.
    pub success: u64,
    /// Documents counted as failed.
    pub failed: u64,
}

/// Shared success/failure accumulators, updated atomically by every worker.
#[derive(Debug, Default)]
pub struct RunCounters {
    success: AtomicU64,
    failed: AtomicU64,
}

impl RunCounters {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one chunk's outcome.
    pub fn record(&self, totals: BulkTotals) {
        self.success.fetch_add(totals.success, Ordering::SeqCst);
        self.failed.fetch_add(totals.failed, Ordering::SeqCst);
    }

    /// Read the current totals.
    pub fn snapshot(&self) -> RunTotals {
        RunTotals {
            success: self.success.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }
}

/// Number of workers for this host: three quarters of the available
/// parallelism, at least one.
pub fn default_worker_count() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cpus * 3 / 4).max(1)
}

/// Spawn `count` workers over the queue.
pub fn spawn_workers(
    count: usize,
    queue: &ChunkQueue,
    indexer: &Arc<ChunkIndexer>,
    counters: &Arc<RunCounters>,
    cancel: &CancelFlag,
) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|id| {
            let queue = queue.clone();
            let indexer = Arc::clone(indexer);
            let counters = Arc::clone(counters);
            let cancel = cancel.clone();
            tokio::spawn(worker_loop(id, queue, indexer, counters, cancel))
        })
        .collect()
}

async fn worker_loop(
    id: usize,
    queue: ChunkQueue,
    indexer: Arc<ChunkIndexer>,
    counters: Arc<RunCounters>,
    cancel: CancelFlag,
) {
    debug!(worker = id, "worker started");

    loop {
        match queue.pop().await {
            Some(QueueItem::Shutdown) => {
                debug!(worker = id, "received shutdown signal");
                queue.mark_done();
                break;
            }
            Some(QueueItem::Chunk(chunk)) => {
                debug!(worker = id, size = chunk.len(), "processing chunk");
                let totals = indexer.process(&chunk).await;
                counters.record(totals);
                queue.mark_done();
            }
            None => {
                error!(worker = id, "hand-off queue closed unexpectedly");
                cancel.set();
                break;
            }
        }
    }

    debug!(worker = id, "worker finished");
}
