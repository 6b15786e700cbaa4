//! OpenSearch query builders.
//!
//! This module provides functions to build the scan queries: a match-all
//! for full scans and a bool/range query for time-windowed scans.

use serde_json::{json, Map, Value};

use reindexer_shared::{RangeBound, SortOrder};

/// Build a match-all query for a full index scan.
pub fn build_match_all() -> Value {
    json!({ "query": { "match_all": {} } })
}

/// Build a range query over the timestamp field.
///
/// Only supplied bounds appear in the query; both are inclusive. When a
/// `format` is given it is forwarded so the engine parses raw date strings
/// server-side. The sort clause makes scroll pagination preserve order.
pub fn build_range_query(
    field: &str,
    gte: Option<&RangeBound>,
    lte: Option<&RangeBound>,
    format: Option<&str>,
    sort_order: SortOrder,
) -> Value {
    let mut range_params = Map::new();

    if let Some(gte) = gte {
        range_params.insert("gte".to_string(), bound_value(gte));
    }
    if let Some(lte) = lte {
        range_params.insert("lte".to_string(), bound_value(lte));
    }
    if let Some(format) = format {
        range_params.insert("format".to_string(), json!(format));
    }

    json!({
        "query": {
            "bool": {
                "must": [
                    { "range": { field: range_params } }
                ]
            }
        },
        "sort": [
            { field: { "order": sort_order.as_str() } }
        ]
    })
}

fn bound_value(bound: &RangeBound) -> Value {
    match bound {
        RangeBound::Raw(date) => json!(date),
        RangeBound::Epoch(epoch) => json!(epoch),
    }
}
