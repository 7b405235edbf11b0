//! GET body → query string encoding.
//!
//! Scalars are stringified as-is; arrays and objects are serialized to
//! compact JSON first so structured filters survive a GET relay.

use serde_json::{Map, Value};
use url::Url;

/// String form of one body value as it appears in the query.
pub fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        // Numbers, booleans, null, arrays and objects all render as JSON text.
        other => other.to_string(),
    }
}

/// Append each body pair to the URL's query, preserving input order.
///
/// An existing query is extended with `&`; a fragment stays after the query.
pub fn append_query(url: &mut Url, body: &Map<String, Value>) {
    if body.is_empty() {
        return;
    }

    let mut pairs = url.query_pairs_mut();
    for (key, value) in body {
        pairs.append_pair(key, &query_value(value));
    }
}
