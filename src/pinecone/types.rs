//! Shared types used by the Pinecone client and the pipelines.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned while interacting with Pinecone.
#[derive(Debug, Error)]
pub enum PineconeError {
    /// Base URL or resolved host failed to parse.
    #[error("Invalid Pinecone URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Pinecone responded with an unexpected status code.
    #[error("Unexpected Pinecone response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from Pinecone.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Index was described successfully but exposes no data-plane host yet.
    #[error("Pinecone index '{0}' has no reachable host")]
    IndexUnavailable(String),
}

/// A vector plus metadata, ready for upsert.
#[derive(Debug, Clone, Serialize)]
pub struct VectorRecord {
    /// Record identifier; document chunks use `{documentName}_{chunkIndex}`.
    pub id: String,
    /// Embedding vector; its dimension must match the index.
    pub values: Vec<f32>,
    /// Filterable metadata stored alongside the vector.
    pub metadata: VectorMetadata,
}

/// Metadata stored with every chunk vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorMetadata {
    /// Name of the owning document; the key queries filter on.
    pub document_name: String,
    /// Chunk text exactly as stored.
    pub page_content: String,
    /// JSON-encoded line range locating the chunk in its document.
    pub loc: String,
}

/// A scored match returned by a similarity query.
///
/// Matches arrive sorted by descending similarity; the store breaks ties in its
/// own order and that order is preserved all the way to API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryMatch {
    /// Identifier of the matched record.
    pub id: String,
    /// Similarity score reported by the store.
    pub score: f32,
    /// Raw vector values, present because queries ask for them.
    #[serde(default)]
    pub values: Option<Vec<f32>>,
    /// Stored metadata, present because queries ask for it.
    #[serde(default)]
    pub metadata: Option<VectorMetadata>,
}

#[derive(Deserialize)]
pub(crate) struct QueryResponseBody {
    #[serde(default)]
    pub(crate) matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
pub(crate) struct DescribeIndexResponse {
    pub(crate) status: DescribeIndexStatus,
}

#[derive(Deserialize)]
pub(crate) struct DescribeIndexStatus {
    #[serde(default)]
    pub(crate) ready: bool,
    #[serde(default)]
    pub(crate) host: Option<String>,
}
