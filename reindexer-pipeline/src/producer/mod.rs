//! Chunk producer.
//!
//! Drains the lazy source stream into fixed-size chunks and hands them to
//! the workers through the bounded queue. The queue push blocks while the
//! workers are behind, which is the pipeline's backpressure mechanism.

use futures::StreamExt;
use tracing::{debug, error, info, warn};

use crate::cancel::CancelFlag;
use crate::queue::{ChunkQueue, QueueItem};
use reindexer_repository::DocumentStream;
use reindexer_shared::SourceDocument;

/// Produces chunks from the source document stream.
pub struct ChunkProducer {
    batch_size: usize,
    worker_count: usize,
    queue: ChunkQueue,
    cancel: CancelFlag,
}

impl ChunkProducer {
    /// Create a producer feeding `worker_count` workers.
    pub fn new(
        batch_size: usize,
        worker_count: usize,
        queue: ChunkQueue,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            batch_size: batch_size.max(1),
            worker_count,
            queue,
            cancel,
        }
    }

    /// Drain the stream to completion, cancellation, or error.
    ///
    /// Whatever the exit path, exactly one shutdown sentinel per worker is
    /// enqueued afterwards so every worker observes a clean stop.
    pub async fn run(self, mut documents: DocumentStream) {
        info!("producer started");

        let mut chunk: Vec<SourceDocument> = Vec::with_capacity(self.batch_size);
        let mut pulled = 0usize;

        loop {
            if self.cancel.is_set() {
                warn!("cancellation requested, producer stopping");
                chunk.clear();
                break;
            }

            match documents.next().await {
                None => break,
                Some(Ok(doc)) => {
                    chunk.push(doc);
                    pulled += 1;

                    if chunk.len() >= self.batch_size {
                        let full =
                            std::mem::replace(&mut chunk, Vec::with_capacity(self.batch_size));
                        debug!(size = full.len(), pulled = pulled, "queueing chunk");
                        if self.queue.push(QueueItem::Chunk(full)).await.is_err() {
                            error!("hand-off queue closed, producer stopping");
                            self.cancel.set();
                            break;
                        }
                    }
                }
                Some(Err(e)) => {
                    error!(error = %e, "failed to read from source stream");
                    self.cancel.set();
                    chunk.clear();
                    break;
                }
            }
        }

        if !chunk.is_empty() && !self.cancel.is_set() {
            debug!(size = chunk.len(), pulled = pulled, "queueing final chunk");
            if self.queue.push(QueueItem::Chunk(chunk)).await.is_err() {
                error!("hand-off queue closed while queueing final chunk");
            }
        }

        info!(documents = pulled, "producer finished, signaling workers");
        for _ in 0..self.worker_count {
            if self.queue.push(QueueItem::Shutdown).await.is_err() {
                error!("hand-off queue closed while signaling shutdown");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    fn docs(count: usize) -> DocumentStream {
        let items: Vec<Result<SourceDocument, _>> = (0..count)
            .map(|i| Ok(SourceDocument::new(format!("doc-{}", i), json!({}))))
            .collect();
        Box::pin(futures::stream::iter(items))
    }

    /// Drain the queue, acknowledging everything, until all sentinels for
    /// `worker_count` workers have been seen. Returns chunk sizes in order.
    async fn drain(queue: &ChunkQueue, worker_count: usize) -> Vec<usize> {
        let mut sizes = Vec::new();
        let mut sentinels = 0;
        while sentinels < worker_count {
            match queue.pop().await.expect("queue should stay open") {
                QueueItem::Chunk(chunk) => sizes.push(chunk.len()),
                QueueItem::Shutdown => sentinels += 1,
            }
            queue.mark_done();
        }
        sizes
    }

    #[tokio::test]
    async fn test_chunks_cover_stream_with_final_partial() {
        let queue = ChunkQueue::new(2);
        let cancel = CancelFlag::new();
        let producer = ChunkProducer::new(3, 2, queue.clone(), cancel);

        let handle = tokio::spawn(producer.run(docs(10)));
        let sizes = drain(&queue, 2).await;
        handle.await.unwrap();

        assert_eq!(sizes, vec![3, 3, 3, 1]);
    }

    #[tokio::test]
    async fn test_exact_multiple_has_no_partial_chunk() {
        let queue = ChunkQueue::new(1);
        let cancel = CancelFlag::new();
        let producer = ChunkProducer::new(3, 1, queue.clone(), cancel);

        let handle = tokio::spawn(producer.run(docs(6)));
        let sizes = drain(&queue, 1).await;
        handle.await.unwrap();

        assert_eq!(sizes, vec![3, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_producer_blocks_until_queue_is_drained() {
        let queue = ChunkQueue::new(1);
        let cancel = CancelFlag::new();
        let producer = ChunkProducer::new(1, 1, queue.clone(), cancel);

        let mut handle = tokio::spawn(producer.run(docs(10)));

        // Nothing drains the queue, so the producer stalls on a full queue
        // instead of running ahead of the workers.
        let stalled = timeout(Duration::from_millis(50), &mut handle).await;
        assert!(stalled.is_err());

        let sizes = drain(&queue, 1).await;
        handle.await.unwrap();
        assert_eq!(sizes.len(), 10);
    }

    #[tokio::test]
    async fn test_cancellation_discards_partial_and_delivers_sentinels() {
        let queue = ChunkQueue::new(3);
        let cancel = CancelFlag::new();
        cancel.set();
        let producer = ChunkProducer::new(10, 3, queue.clone(), cancel);

        let handle = tokio::spawn(producer.run(docs(5)));
        let sizes = drain(&queue, 3).await;
        handle.await.unwrap();

        assert!(sizes.is_empty());
        queue.join().await;
    }

    #[tokio::test]
    async fn test_stream_error_sets_cancel_flag_and_delivers_sentinels() {
        let queue = ChunkQueue::new(2);
        let cancel = CancelFlag::new();
        let producer = ChunkProducer::new(10, 2, queue.clone(), cancel.clone());

        let items: Vec<Result<SourceDocument, _>> = vec![
            Ok(SourceDocument::new("a", json!({}))),
            Ok(SourceDocument::new("b", json!({}))),
            Err(reindexer_repository::SearchError::scroll("cursor expired")),
        ];
        let stream: DocumentStream = Box::pin(futures::stream::iter(items));

        let handle = tokio::spawn(producer.run(stream));
        let sizes = drain(&queue, 2).await;
        handle.await.unwrap();

        // The partial chunk is discarded, only sentinels are delivered.
        assert!(sizes.is_empty());
        assert!(cancel.is_set());
    }
}
