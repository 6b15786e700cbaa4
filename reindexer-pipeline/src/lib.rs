//! # Reindexer Pipeline
//!
//! This crate provides the pipeline components for streaming documents out
//! of a source index and bulk-writing them into time-partitioned
//! destination indices.
//!
//! ## Architecture
//!
//! The pipeline follows the producer/worker pattern over a bounded queue:
//!
//! 1. **Producer**: Drains the source document stream into fixed-size chunks
//! 2. **Queue**: Bounded hand-off between producer and workers (backpressure)
//! 3. **Workers**: Map each chunk to write actions and bulk-write it with
//!    retry and connection recovery
//! 4. **Orchestrator**: Coordinates the pipeline flow and aggregates totals

pub mod cancel;
pub mod errors;
pub mod indexer;
pub mod mapper;
pub mod orchestrator;
pub mod producer;
pub mod queue;
pub mod worker;

pub use cancel::CancelFlag;
pub use errors::{MapError, PipelineError};
pub use orchestrator::Orchestrator;
pub use worker::RunTotals;
