//! Document pipeline: chunking, embedding, and Pinecone orchestration.

pub mod chunking;
mod service;
pub mod types;

pub use service::{DocumentApi, DocumentService};
pub use types::{
    Answer, Chunk, ChunkingError, IngestError, IngestOutcome, LineRange, QueryError, SourceMatch,
};
