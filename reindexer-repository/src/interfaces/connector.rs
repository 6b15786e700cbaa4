//! Connector trait definition.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;

/// Establishes connections to the search engine.
///
/// The connection manager calls this whenever it needs a fresh handle: on
/// first use and after a failed liveness probe or forced invalidation.
/// Implementations verify the new handle (ping) before returning it.
#[async_trait]
pub trait SearchConnector: Send + Sync {
    /// Establish and verify a new connection.
    async fn connect(&self) -> Result<Arc<dyn SearchEngineClient>, SearchError>;
}
