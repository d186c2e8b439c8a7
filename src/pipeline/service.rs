//! Document service coordinating chunking, embedding, and Pinecone operations.

use crate::{
    config::Config,
    embedding::EmbeddingClient,
    metrics::{MetricsSnapshot, PipelineMetrics},
    pinecone::{PineconeClient, VectorMetadata, VectorRecord},
    pipeline::{
        chunking::split_text,
        types::{Answer, Chunk, IngestError, IngestOutcome, QueryError, SourceMatch},
    },
    synthesis::AnswerSynthesizer,
};
use async_trait::async_trait;
use serde_json::json;

/// Coordinates the full pipeline: chunking, embedding, Pinecone writes, and
/// answer synthesis.
///
/// The service owns long-lived handles to the embedding client, the vector
/// store transport, the synthesizer, and the metrics registry so that every
/// HTTP handler reuses the same components. Construct it once near process
/// start and share it through an `Arc`.
pub struct DocumentService {
    embedding_client: Box<dyn EmbeddingClient>,
    vector_store: PineconeClient,
    synthesizer: Box<dyn AnswerSynthesizer>,
    metrics: PipelineMetrics,
    chunk_max_size: usize,
    upsert_batch_size: usize,
    query_top_k: usize,
    context_separator: String,
}

/// Abstraction over the document pipeline used by the HTTP surface.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Chunk, embed, and index raw text under the given document name.
    async fn ingest_document(
        &self,
        document_name: &str,
        text: String,
    ) -> Result<IngestOutcome, IngestError>;

    /// Answer a question using the named document's chunks as context.
    async fn answer_question(
        &self,
        document_name: &str,
        question: &str,
    ) -> Result<Answer, QueryError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl DocumentService {
    /// Build a new document service from its collaborators and tuning knobs.
    pub fn new(
        embedding_client: Box<dyn EmbeddingClient>,
        vector_store: PineconeClient,
        synthesizer: Box<dyn AnswerSynthesizer>,
        config: &Config,
    ) -> Self {
        Self {
            embedding_client,
            vector_store,
            synthesizer,
            metrics: PipelineMetrics::new(),
            chunk_max_size: config.chunk_max_size,
            upsert_batch_size: config.upsert_batch_size.max(1),
            query_top_k: config.query_top_k,
            context_separator: config.context_separator.clone(),
        }
    }

    /// Chunk, embed, and index a document.
    ///
    /// Chunk ids are deterministic (`{name}_{index}`), so re-uploading a
    /// document overwrites its earlier chunks in place.
    pub async fn ingest_document(
        &self,
        document_name: &str,
        text: String,
    ) -> Result<IngestOutcome, IngestError> {
        tracing::info!(document = document_name, "Ingesting document");
        let chunks = split_text(&text, self.chunk_max_size)?;
        let inputs: Vec<String> = chunks
            .iter()
            .map(|chunk| normalize_for_embedding(&chunk.content))
            .collect();
        let embeddings = if inputs.is_empty() {
            Vec::new()
        } else {
            self.embedding_client.embed(&inputs).await?
        };

        debug_assert_eq!(chunks.len(), embeddings.len());

        let records: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(index, (chunk, vector))| {
                build_vector_record(document_name, index, chunk, vector)
            })
            .collect();

        let chunk_count = records.len();
        let mut batches_sent = 0;
        for batch in records.chunks(self.upsert_batch_size) {
            self.vector_store.upsert(batch).await?;
            batches_sent += 1;
            tracing::debug!(batch = batches_sent, vectors = batch.len(), "Upserted batch");
        }

        self.metrics.record_document(chunk_count as u64);
        tracing::info!(
            document = document_name,
            chunks = chunk_count,
            batches = batches_sent,
            "Document indexed"
        );

        Ok(IngestOutcome {
            chunk_count,
            chunk_size: self.chunk_max_size,
            batches_sent,
        })
    }

    /// Answer a question against one document's indexed chunks.
    ///
    /// The store's ranking order is preserved both in the stuffed context and
    /// in the returned sources.
    pub async fn answer_question(
        &self,
        document_name: &str,
        question: &str,
    ) -> Result<Answer, QueryError> {
        tracing::info!(document = document_name, "Answering question");
        let vector = self
            .embedding_client
            .embed_one(&normalize_for_embedding(question))
            .await?;
        let matches = self
            .vector_store
            .query(vector, self.query_top_k, document_name)
            .await?;

        let match_count = matches.len();
        let context = matches
            .iter()
            .filter_map(|hit| hit.metadata.as_ref())
            .map(|metadata| metadata.page_content.as_str())
            .collect::<Vec<_>>()
            .join(&self.context_separator);
        tracing::debug!(matches = match_count, "Assembled context");

        let result = self.synthesizer.synthesize(&context, question).await?;

        let sources: Vec<SourceMatch> = matches
            .into_iter()
            .filter_map(|hit| {
                hit.metadata.map(|metadata| SourceMatch {
                    page_content: metadata.page_content,
                    score: hit.score,
                })
            })
            .collect();

        self.metrics.record_question();
        tracing::info!(
            document = document_name,
            matches = match_count,
            "Question answered"
        );

        Ok(Answer { result, sources })
    }

    /// Return the current pipeline metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl DocumentApi for DocumentService {
    async fn ingest_document(
        &self,
        document_name: &str,
        text: String,
    ) -> Result<IngestOutcome, IngestError> {
        DocumentService::ingest_document(self, document_name, text).await
    }

    async fn answer_question(
        &self,
        document_name: &str,
        question: &str,
    ) -> Result<Answer, QueryError> {
        DocumentService::answer_question(self, document_name, question).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        DocumentService::metrics_snapshot(self)
    }
}

/// Embedding providers treat line breaks as weak token boundaries, so inputs
/// are flattened to single-line strings before they are sent.
fn normalize_for_embedding(text: &str) -> String {
    text.replace('\n', " ")
}

fn build_vector_record(
    document_name: &str,
    index: usize,
    chunk: Chunk,
    values: Vec<f32>,
) -> VectorRecord {
    let loc = json!({ "lines": { "from": chunk.lines.from, "to": chunk.lines.to } }).to_string();
    VectorRecord {
        id: format!("{document_name}_{index}"),
        values,
        metadata: VectorMetadata {
            document_name: document_name.to_string(),
            page_content: chunk.content,
            loc,
        },
    }
}
