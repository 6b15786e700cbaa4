//! Response body parsing for scan and bulk operations.

use serde_json::{json, Value};
use tracing::warn;

use crate::types::BulkTotals;
use reindexer_shared::SourceDocument;

/// Parse a single search hit into a [`SourceDocument`].
///
/// Returns `None` when the hit carries no `_id`; a missing `_source` becomes
/// an empty field map.
pub fn parse_hit(hit: &Value) -> Option<SourceDocument> {
    let id = hit.get("_id")?.as_str()?;
    let source = hit
        .get("_source")
        .cloned()
        .unwrap_or_else(|| json!({}));

    Some(SourceDocument::new(id, source))
}

/// Parse every hit of a search or scroll response page.
pub fn parse_hits(body: &Value) -> Vec<SourceDocument> {
    let hits = match body["hits"]["hits"].as_array() {
        Some(hits) => hits,
        None => return Vec::new(),
    };

    hits.iter()
        .filter_map(|hit| {
            let parsed = parse_hit(hit);
            if parsed.is_none() {
                warn!("skipping malformed hit without _id");
            }
            parsed
        })
        .collect()
}

/// Extract the scroll cursor from a search or scroll response.
pub fn scroll_id(body: &Value) -> Option<String> {
    body["_scroll_id"].as_str().map(str::to_string)
}

/// Aggregate a bulk response into success/failure counts.
///
/// Counts per-item statuses when the `items` array is present; a 2xx status
/// is a success, anything else (including a missing status) a failure. When
/// the engine elides the item detail the top-level `errors` flag decides the
/// whole batch.
pub fn parse_bulk_totals(body: &Value, attempted: usize) -> BulkTotals {
    let attempted = attempted as u64;

    let items = match body["items"].as_array() {
        Some(items) => items,
        None => {
            return if body["errors"].as_bool().unwrap_or(false) {
                BulkTotals::new(0, attempted)
            } else {
                BulkTotals::new(attempted, 0)
            };
        }
    };

    let mut success = 0;
    let mut failed = 0;
    for item in items {
        let status = item
            .as_object()
            .and_then(|ops| ops.values().next())
            .and_then(|op| op.get("status"))
            .and_then(Value::as_u64);

        match status {
            Some(code) if (200..300).contains(&code) => success += 1,
            _ => failed += 1,
        }
    }

    BulkTotals::new(success, failed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hit() {
        let hit = json!({
            "_id": "doc-1",
            "_source": { "created_at": 1_704_067_200, "level": "info" }
        });

        let doc = parse_hit(&hit).unwrap();
        assert_eq!(doc.id, "doc-1");
        assert_eq!(doc.source["level"], "info");
    }

    #[test]
    fn test_parse_hit_without_source() {
        let hit = json!({ "_id": "doc-2" });

        let doc = parse_hit(&hit).unwrap();
        assert_eq!(doc.id, "doc-2");
        assert!(doc.source.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_parse_hit_without_id() {
        let hit = json!({ "_source": { "a": 1 } });
        assert!(parse_hit(&hit).is_none());
    }

    #[test]
    fn test_parse_hits_skips_malformed() {
        let body = json!({
            "hits": {
                "hits": [
                    { "_id": "a", "_source": {} },
                    { "_source": {} },
                    { "_id": "b", "_source": {} }
                ]
            }
        });

        let docs = parse_hits(&body);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "a");
        assert_eq!(docs[1].id, "b");
    }

    #[test]
    fn test_scroll_id() {
        let body = json!({ "_scroll_id": "cursor-123", "hits": { "hits": [] } });
        assert_eq!(scroll_id(&body).as_deref(), Some("cursor-123"));
        assert!(scroll_id(&json!({})).is_none());
    }

    #[test]
    fn test_parse_bulk_totals_counts_items() {
        let body = json!({
            "errors": true,
            "items": [
                { "index": { "_id": "a", "status": 201 } },
                { "index": { "_id": "b", "status": 429 } },
                { "index": { "_id": "c", "status": 200 } }
            ]
        });

        let totals = parse_bulk_totals(&body, 3);
        assert_eq!(totals, BulkTotals::new(2, 1));
    }

    #[test]
    fn test_parse_bulk_totals_missing_status_is_failure() {
        let body = json!({
            "items": [
                { "index": { "_id": "a" } }
            ]
        });

        assert_eq!(parse_bulk_totals(&body, 1), BulkTotals::new(0, 1));
    }

    #[test]
    fn test_parse_bulk_totals_errors_false_fast_path() {
        let body = json!({ "errors": false, "took": 12 });
        assert_eq!(parse_bulk_totals(&body, 5), BulkTotals::new(5, 0));
    }

    #[test]
    fn test_parse_bulk_totals_errors_true_without_items() {
        let body = json!({ "errors": true });
        assert_eq!(parse_bulk_totals(&body, 5), BulkTotals::new(0, 5));
    }
}
