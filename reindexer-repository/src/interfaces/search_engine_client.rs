//! Search engine client trait definition.
//!
//! This module defines the abstract interface for the two engine
//! capabilities the pipeline consumes: streaming documents out of the source
//! index and bulk-writing actions into destination indices.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::errors::SearchError;
use crate::types::BulkTotals;
use reindexer_shared::{RangeBound, SourceDocument, WriteAction};

/// A lazy, single-pass stream of source documents.
///
/// Documents are pulled one at a time; the implementation paginates against
/// the engine behind the scenes. The stream is not restartable.
pub type DocumentStream =
    Pin<Box<dyn Stream<Item = Result<SourceDocument, SearchError>> + Send>>;

/// Abstract interface for search engine operations.
///
/// Implementations can be swapped for different backends (OpenSearch, mock,
/// etc.) enabling easy testing.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Stream every document in the source index.
    ///
    /// # Returns
    ///
    /// * `Ok(DocumentStream)` - A lazy stream over all documents
    /// * `Err(SearchError)` - If the scan cannot be prepared
    async fn scan_all(&self) -> Result<DocumentStream, SearchError>;

    /// Stream documents whose timestamp falls inside the given window.
    ///
    /// Bounds are inclusive and already resolved to the configured time
    /// representation; only supplied bounds restrict the scan.
    ///
    /// # Arguments
    ///
    /// * `gte` - Optional inclusive lower bound
    /// * `lte` - Optional inclusive upper bound
    async fn scan_range(
        &self,
        gte: Option<&RangeBound>,
        lte: Option<&RangeBound>,
    ) -> Result<DocumentStream, SearchError>;

    /// Write a set of actions in a single bulk operation.
    ///
    /// # Arguments
    ///
    /// * `actions` - The actions to write; must not be empty
    ///
    /// # Returns
    ///
    /// * `Ok(BulkTotals)` - Aggregate success/failure counts as reported by
    ///   the engine
    /// * `Err(SearchError)` - If the bulk request fails as a whole
    async fn bulk_write(&self, actions: &[WriteAction]) -> Result<BulkTotals, SearchError>;

    /// Probe whether the engine is reachable and responsive.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The engine answered the probe
    /// * `Ok(false)` - The engine answered but reported itself unavailable
    /// * `Err(SearchError)` - The probe could not be executed
    async fn ping(&self) -> Result<bool, SearchError>;
}
