//! Scroll-paginated document streaming.
//!
//! The scan runs lazily: nothing is sent to the engine until the stream is
//! first polled, and each page is fetched only once the previous one has
//! been drained. The scroll context is cleared when the scan is exhausted.

use std::collections::VecDeque;

use futures::Stream;
use opensearch::{ClearScrollParts, OpenSearch, ScrollParts, SearchParts};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::SearchError;
use crate::opensearch::response;
use reindexer_shared::SourceDocument;

/// Server-side page size for scan requests.
pub(crate) const PAGE_SIZE: i64 = 1000;

/// Lifetime of the server-side scroll cursor.
pub(crate) const SCROLL_TTL: &str = "5m";

enum Phase {
    Start,
    Continue(String),
    Done,
}

struct ScanState {
    client: OpenSearch,
    index: String,
    query: Value,
    phase: Phase,
    buffered: VecDeque<SourceDocument>,
}

/// Build a stream that yields every document matched by `query` in `index`,
/// paginating with the search/scroll API.
pub(crate) fn scroll_stream(
    client: OpenSearch,
    index: String,
    query: Value,
) -> impl Stream<Item = Result<SourceDocument, SearchError>> + Send {
    let state = ScanState {
        client,
        index,
        query,
        phase: Phase::Start,
        buffered: VecDeque::new(),
    };

    futures::stream::try_unfold(state, |mut state| async move {
        loop {
            if let Some(doc) = state.buffered.pop_front() {
                return Ok(Some((doc, state)));
            }

            match std::mem::replace(&mut state.phase, Phase::Done) {
                Phase::Done => return Ok(None),
                Phase::Start => {
                    let body = first_page(&state.client, &state.index, &state.query).await?;
                    let hits = response::parse_hits(&body);
                    debug!(count = hits.len(), "received first scan page");

                    match response::scroll_id(&body) {
                        Some(id) if !hits.is_empty() => state.phase = Phase::Continue(id),
                        Some(id) => clear_scroll(&state.client, &id).await,
                        None => {}
                    }
                    state.buffered = hits.into();
                }
                Phase::Continue(id) => {
                    let body = next_page(&state.client, &id).await?;
                    let hits = response::parse_hits(&body);
                    debug!(count = hits.len(), "received scroll page");

                    if hits.is_empty() {
                        clear_scroll(&state.client, &id).await;
                    } else {
                        let next_id = response::scroll_id(&body).unwrap_or(id);
                        state.phase = Phase::Continue(next_id);
                        state.buffered = hits.into();
                    }
                }
            }
        }
    })
}

async fn first_page(
    client: &OpenSearch,
    index: &str,
    query: &Value,
) -> Result<Value, SearchError> {
    let response = client
        .search(SearchParts::Index(&[index]))
        .scroll(SCROLL_TTL)
        .size(PAGE_SIZE)
        .body(query.clone())
        .send()
        .await
        .map_err(|e| SearchError::query(e.to_string()))?;

    let status = response.status_code();
    if !status.is_success() {
        let error_body = response.text().await.unwrap_or_default();
        return Err(SearchError::query(format!(
            "scan request failed with status {}: {}",
            status, error_body
        )));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| SearchError::parse(e.to_string()))
}

async fn next_page(client: &OpenSearch, scroll_id: &str) -> Result<Value, SearchError> {
    let response = client
        .scroll(ScrollParts::None)
        .body(json!({ "scroll": SCROLL_TTL, "scroll_id": scroll_id }))
        .send()
        .await
        .map_err(|e| SearchError::scroll(e.to_string()))?;

    let status = response.status_code();
    if !status.is_success() {
        let error_body = response.text().await.unwrap_or_default();
        return Err(SearchError::scroll(format!(
            "scroll request failed with status {}: {}",
            status, error_body
        )));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| SearchError::parse(e.to_string()))
}

/// Best-effort release of the server-side scroll cursor.
async fn clear_scroll(client: &OpenSearch, scroll_id: &str) {
    let result = client
        .clear_scroll(ClearScrollParts::None)
        .body(json!({ "scroll_id": [scroll_id] }))
        .send()
        .await;

    if let Err(e) = result {
        warn!(error = %e, "failed to clear scroll context");
    }
}
