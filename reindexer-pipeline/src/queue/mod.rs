//! Bounded hand-off queue between the producer and the worker pool.
//!
//! Capacity equals the worker count, so at most `worker_count` chunks are
//! in flight and the producer blocks as soon as the workers fall behind.
//! Every popped item must be acknowledged with [`mark_done`]; [`join`]
//! resolves once everything pushed has been acknowledged, which is how the
//! orchestrator detects a fully drained run.
//!
//! [`mark_done`]: ChunkQueue::mark_done
//! [`join`]: ChunkQueue::join

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex, Notify};

use crate::errors::PipelineError;
use reindexer_shared::SourceDocument;

/// An item moving through the hand-off queue.
#[derive(Debug)]
pub enum QueueItem {
    /// A batch of source documents to map and write.
    Chunk(Vec<SourceDocument>),
    /// Termination sentinel; one per worker.
    Shutdown,
}

/// Bounded FIFO hand-off with drain detection.
#[derive(Clone)]
pub struct ChunkQueue {
    tx: mpsc::Sender<QueueItem>,
    rx: Arc<Mutex<mpsc::Receiver<QueueItem>>>,
    outstanding: Arc<AtomicUsize>,
    drained: Arc<Notify>,
}

impl ChunkQueue {
    /// Create a queue holding at most `capacity` items.
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
            outstanding: Arc::new(AtomicUsize::new(0)),
            drained: Arc::new(Notify::new()),
        }
    }

    /// Enqueue an item, waiting while the queue is full.
    pub async fn push(&self, item: QueueItem) -> Result<(), PipelineError> {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(item).await.is_err() {
            self.mark_done();
            return Err(PipelineError::QueueClosed);
        }
        Ok(())
    }

    /// Dequeue the next item, waiting while the queue is empty.
    ///
    /// Returns `None` only if every sender side has been dropped.
    pub async fn pop(&self) -> Option<QueueItem> {
        self.rx.lock().await.recv().await
    }

    /// Acknowledge a previously popped item.
    pub fn mark_done(&self) {
        if self.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drained.notify_waiters();
        }
    }

    /// Wait until every pushed item has been acknowledged.
    pub async fn join(&self) {
        loop {
            let notified = self.drained.notified();
            if self.outstanding.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}
