//! Core data types and error definitions for the ingestion and query pipelines.

use crate::embedding::EmbeddingError;
use crate::pinecone::PineconeError;
use crate::synthesis::SynthesisError;
use thiserror::Error;

/// Errors produced while splitting raw text into chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Splitting was requested with an impossible size budget.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// Errors emitted by the document ingestion pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Chunking step failed to segment the document.
    #[error("Failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
    /// Embedding provider failed to produce vectors for the chunk batch.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingError),
    /// Vector store rejected an upsert.
    #[error("Pinecone request failed: {0}")]
    VectorStore(#[from] PineconeError),
}

/// Errors emitted by the question-answering pipeline.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Embedding provider failed to return a vector for the question.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingError),
    /// Vector store similarity query failed.
    #[error("Pinecone request failed: {0}")]
    VectorStore(#[from] PineconeError),
    /// Language model failed to synthesize an answer.
    #[error("Failed to synthesize answer: {0}")]
    Synthesis(#[from] SynthesisError),
}

/// A contiguous segment of a source document produced by the splitter.
///
/// Concatenating a document's chunks in order reproduces the document text
/// exactly; separators are never dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk text, exactly as it appears in the source document.
    pub content: String,
    /// Line numbers the chunk spans within the source document.
    pub lines: LineRange,
}

/// 1-based inclusive line numbers locating a chunk in its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    /// First line covered by the chunk.
    pub from: usize,
    /// Last line covered by the chunk's content; a trailing line break counts
    /// toward the line it terminates, not the one it opens.
    pub to: usize,
}

/// Summary of a completed ingestion produced by
/// [`crate::pipeline::DocumentService::ingest_document`].
#[derive(Debug, Clone, Copy)]
pub struct IngestOutcome {
    /// Number of chunks produced for the document.
    pub chunk_count: usize,
    /// Maximum chunk size in effect during splitting.
    pub chunk_size: usize,
    /// Number of upsert calls issued, the final partial batch included.
    pub batches_sent: usize,
}

/// Answer produced by the question pipeline.
#[derive(Debug, Clone)]
pub struct Answer {
    /// Text generated by the language model.
    pub result: String,
    /// Retrieved chunks backing the answer, in the order the store returned them.
    pub sources: Vec<SourceMatch>,
}

/// A retrieved chunk cited as supporting material for an answer.
#[derive(Debug, Clone)]
pub struct SourceMatch {
    /// Stored chunk text.
    pub page_content: String,
    /// Similarity score reported by the store.
    pub score: f32,
}
