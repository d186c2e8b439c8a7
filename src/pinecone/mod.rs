//! Pinecone integration used as the vector store backend.
//!
//! Split into a thin HTTP [`client`](crate::pinecone::client), the metadata
//! [`filters`](crate::pinecone::filters) applied at query time, and the wire
//! [`types`](crate::pinecone::types) shared by both.

pub mod client;
pub mod filters;
pub mod types;

pub use client::PineconeClient;
pub use filters::document_filter;
pub use types::{PineconeError, QueryMatch, VectorMetadata, VectorRecord};
