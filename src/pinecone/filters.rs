//! Metadata filter construction for similarity queries.

use serde_json::{Value, json};

/// Build the filter restricting a query to a single document's chunks.
///
/// The key must match the `documentName` metadata field written at upsert time;
/// the value is compared with Pinecone's `$eq` operator.
pub fn document_filter(document_name: &str) -> Value {
    json!({ "documentName": { "$eq": document_name } })
}
