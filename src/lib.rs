#![deny(missing_docs)]

//! Core library for the docchat document search and question answering service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and OpenAI adapter.
pub mod embedding;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion and question metrics helpers.
pub mod metrics;
/// Pinecone vector store integration.
pub mod pinecone;
/// Document pipeline: chunking, indexing, and question answering.
pub mod pipeline;
/// Answer synthesis via a chat language model.
pub mod synthesis;
