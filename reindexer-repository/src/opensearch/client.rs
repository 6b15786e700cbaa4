//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! (document scans, bulk writes, liveness probe) and the connector that the
//! connection manager uses to (re-)establish it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use opensearch::auth::Credentials;
use opensearch::http::request::JsonBody;
use opensearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use opensearch::{BulkParts, OpenSearch};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::SearchError;
use crate::interfaces::{DocumentStream, SearchConnector, SearchEngineClient};
use crate::opensearch::{queries, response, scan};
use crate::types::BulkTotals;
use reindexer_shared::{
    ConnectionSettings, EngineSettings, QuerySettings, RangeBound, TimeUnit, WriteAction,
};

/// OpenSearch client for the source and destination indices.
pub struct OpenSearchClient {
    client: OpenSearch,
    engine: EngineSettings,
    query: QuerySettings,
}

impl OpenSearchClient {
    /// Create a new client from the validated settings.
    ///
    /// # Arguments
    ///
    /// * `connection` - Endpoint, credentials, and request timeout
    /// * `engine` - Source index, timestamp field, and chunking parameters
    /// * `query` - Time-window settings (sort order, time representation)
    pub fn new(
        connection: &ConnectionSettings,
        engine: EngineSettings,
        query: QuerySettings,
    ) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(&connection.url)
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(Duration::from_secs(connection.timeout_secs));

        if !connection.username.is_empty() {
            builder = builder.auth(Credentials::Basic(
                connection.username.clone(),
                connection.password.clone(),
            ));
        }

        let transport = builder
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        Ok(Self {
            client: OpenSearch::new(transport),
            engine,
            query,
        })
    }

    /// The range `format` parameter forwarded to the engine, when the time
    /// representation is epoch-based.
    fn range_format(&self) -> Option<&'static str> {
        match self.query.time_unit {
            TimeUnit::Raw => None,
            unit => Some(unit.as_str()),
        }
    }
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    async fn scan_all(&self) -> Result<DocumentStream, SearchError> {
        debug!(index = %self.engine.source_index, "starting full scan");
        let query = queries::build_match_all();

        Ok(Box::pin(scan::scroll_stream(
            self.client.clone(),
            self.engine.source_index.clone(),
            query,
        )))
    }

    async fn scan_range(
        &self,
        gte: Option<&RangeBound>,
        lte: Option<&RangeBound>,
    ) -> Result<DocumentStream, SearchError> {
        debug!(
            index = %self.engine.source_index,
            field = %self.engine.timestamp_field,
            "starting range scan"
        );
        let query = queries::build_range_query(
            &self.engine.timestamp_field,
            gte,
            lte,
            self.range_format(),
            self.query.sort_order,
        );

        Ok(Box::pin(scan::scroll_stream(
            self.client.clone(),
            self.engine.source_index.clone(),
            query,
        )))
    }

    async fn bulk_write(&self, actions: &[WriteAction]) -> Result<BulkTotals, SearchError> {
        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(actions.len() * 2);
        for action in actions {
            body.push(json!({ "index": { "_index": action.index, "_id": action.id } }).into());
            body.push(action.source.clone().into());
        }

        let response = self
            .client
            .bulk(BulkParts::None)
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::bulk_write(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "bulk request failed");
            return Err(SearchError::bulk_write(format!(
                "bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let totals = response::parse_bulk_totals(&body, actions.len());
        debug!(
            success = totals.success,
            failed = totals.failed,
            "bulk write complete"
        );
        Ok(totals)
    }

    async fn ping(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        Ok(response.status_code().is_success())
    }
}

/// Connector that builds and verifies [`OpenSearchClient`] instances.
pub struct OpenSearchConnector {
    connection: ConnectionSettings,
    engine: EngineSettings,
    query: QuerySettings,
}

impl OpenSearchConnector {
    /// Create a connector from the validated settings.
    pub fn new(
        connection: ConnectionSettings,
        engine: EngineSettings,
        query: QuerySettings,
    ) -> Self {
        Self {
            connection,
            engine,
            query,
        }
    }
}

#[async_trait]
impl SearchConnector for OpenSearchConnector {
    async fn connect(&self) -> Result<Arc<dyn SearchEngineClient>, SearchError> {
        info!(url = %self.connection.url, "connecting to search engine");

        let client = OpenSearchClient::new(
            &self.connection,
            self.engine.clone(),
            self.query.clone(),
        )?;

        if !client.ping().await? {
            return Err(SearchError::connection(format!(
                "search engine at {} did not answer ping",
                self.connection.url
            )));
        }

        info!(url = %self.connection.url, "connected to search engine");
        Ok(Arc::new(client))
    }
}
