//! Orchestrator for the reindex pipeline.
//!
//! Wires the producer, queue, and worker pool together, waits for a full
//! drain, and aggregates the run totals. The search engine connection is
//! released on every exit path.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::cancel::CancelFlag;
use crate::errors::PipelineError;
use crate::indexer::ChunkIndexer;
use crate::mapper::{DocumentMapper, RangeCheck};
use crate::producer::ChunkProducer;
use crate::queue::ChunkQueue;
use crate::worker::{default_worker_count, spawn_workers, RunCounters, RunTotals};
use reindexer_repository::ConnectionManager;
use reindexer_shared::{EngineSettings, QuerySettings};

/// Coordinates one reindex run from stream to totals.
pub struct Orchestrator {
    connections: Arc<ConnectionManager>,
    engine: EngineSettings,
    query: QuerySettings,
    worker_count: usize,
    cancel: CancelFlag,
}

impl Orchestrator {
    /// Create an orchestrator with the default worker count for this host.
    pub fn new(
        connections: Arc<ConnectionManager>,
        engine: EngineSettings,
        query: QuerySettings,
    ) -> Self {
        Self {
            connections,
            engine,
            query,
            worker_count: default_worker_count(),
            cancel: CancelFlag::new(),
        }
    }

    /// Override the worker count (clamped to at least one).
    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count.max(1);
        self
    }

    /// The run's cancellation flag, for external shutdown triggers.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Execute the run to completion and return the aggregated totals.
    ///
    /// On any error the cancellation flag is set before the error
    /// propagates. The connection is released in all cases.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<RunTotals, PipelineError> {
        info!(
            workers = self.worker_count,
            batch_size = self.engine.batch_size,
            source = %self.engine.source_index,
            "starting reindex run"
        );

        let result = self.execute().await;
        if result.is_err() {
            self.cancel.set();
        }

        // Cleanup runs on every path and never fails.
        self.connections.close().await;

        match &result {
            Ok(totals) => info!(
                success = totals.success,
                failed = totals.failed,
                "reindex run complete"
            ),
            Err(e) => error!(error = %e, "reindex run failed"),
        }

        result
    }

    async fn execute(&self) -> Result<RunTotals, PipelineError> {
        let client = self.connections.ensure().await?;

        let range = self
            .query
            .resolve()
            .map_err(|e| PipelineError::setup(e.to_string()))?;

        let stream = match &range {
            None => client.scan_all().await?,
            Some(resolved) => {
                client
                    .scan_range(resolved.query_gte.as_ref(), resolved.query_lte.as_ref())
                    .await?
            }
        };
        drop(client);

        let mapper = DocumentMapper::new(
            self.engine.timestamp_field.clone(),
            self.engine.dest_index_base.clone(),
            self.engine.date_format,
            self.query.time_unit,
            range.map(|r| RangeCheck {
                gte: r.check_gte,
                lte: r.check_lte,
            }),
        );
        let indexer = Arc::new(ChunkIndexer::new(
            Arc::clone(&self.connections),
            mapper,
            self.engine.max_retries,
        ));

        let queue = ChunkQueue::new(self.worker_count);
        let counters = Arc::new(RunCounters::new());
        let workers = spawn_workers(self.worker_count, &queue, &indexer, &counters, &self.cancel);

        let producer = ChunkProducer::new(
            self.engine.batch_size,
            self.worker_count,
            queue.clone(),
            self.cancel.clone(),
        );
        let producer_handle = tokio::spawn(producer.run(stream));

        producer_handle
            .await
            .map_err(|e| PipelineError::producer(format!("producer task failed: {}", e)))?;
        info!("producer completed, waiting for queue drain");

        queue.join().await;
        info!("all chunks processed");

        self.join_workers(workers).await?;

        Ok(counters.snapshot())
    }

    async fn join_workers(&self, workers: Vec<JoinHandle<()>>) -> Result<(), PipelineError> {
        for (id, handle) in workers.into_iter().enumerate() {
            handle
                .await
                .map_err(|e| PipelineError::worker(format!("worker {} failed: {}", id, e)))?;
        }
        Ok(())
    }
}
