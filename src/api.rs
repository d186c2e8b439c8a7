//! HTTP surface for the document chat service.
//!
//! This module exposes a compact Axum router with three endpoints:
//!
//! - `POST /upload-document` – Chunk a raw document, generate embeddings, and persist them in
//!   Pinecone. Always answers `200` with `{ "success": bool }`; ingestion failures are logged
//!   server-side instead of being surfaced to the uploader.
//! - `POST /ask` – Embed a question, retrieve the most similar chunks of one document, and
//!   synthesize an answer from them. Returns the answer text plus the scored source chunks.
//! - `GET /metrics` – Observe ingestion and question counters.

use crate::metrics::MetricsSnapshot;
use crate::pipeline::{DocumentApi, QueryError};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Build the HTTP router exposing the document pipeline.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: DocumentApi + 'static,
{
    Router::new()
        .route("/upload-document", post(upload_document::<S>))
        .route("/ask", post(ask_question::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .with_state(service)
}

/// Request body for the `POST /upload-document` endpoint.
#[derive(Deserialize)]
struct UploadRequest {
    /// Raw document contents to chunk and index.
    text: String,
    /// Document name used for chunk ids and query filtering.
    name: String,
}

/// Response body for the `POST /upload-document` endpoint.
#[derive(Serialize)]
struct UploadResponse {
    /// Whether the document made it through the full ingestion pipeline.
    success: bool,
}

/// Ingest a document under the given name.
///
/// The response is `200` either way; a failed pipeline run is reported as
/// `success: false` and logged with the underlying error.
async fn upload_document<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<UploadRequest>,
) -> Json<UploadResponse>
where
    S: DocumentApi,
{
    let UploadRequest { text, name } = request;
    match service.ingest_document(&name, text).await {
        Ok(outcome) => {
            tracing::info!(
                document = %name,
                chunks = outcome.chunk_count,
                batches = outcome.batches_sent,
                "Upload request completed"
            );
            Json(UploadResponse { success: true })
        }
        Err(error) => {
            tracing::error!(document = %name, error = %error, "Upload request failed");
            Json(UploadResponse { success: false })
        }
    }
}

/// Request body for the `POST /ask` endpoint.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AskRequest {
    /// Question to answer.
    question: String,
    /// Document whose chunks are searched for context.
    document_name: String,
}

/// Response body for the `POST /ask` endpoint.
#[derive(Serialize)]
struct AskResponse {
    /// Answer text generated by the language model.
    result: String,
    /// Retrieved chunks backing the answer, most similar first.
    sources: Vec<SourceEntry>,
}

/// One retrieved chunk in an [`AskResponse`].
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceEntry {
    page_content: String,
    score: f32,
}

/// Answer a question using the named document as context.
async fn ask_question<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError>
where
    S: DocumentApi,
{
    let answer = service
        .answer_question(&request.document_name, &request.question)
        .await?;
    tracing::info!(
        document = %request.document_name,
        sources = answer.sources.len(),
        "Ask request completed"
    );
    Ok(Json(AskResponse {
        result: answer.result,
        sources: answer
            .sources
            .into_iter()
            .map(|source| SourceEntry {
                page_content: source.page_content,
                score: source.score,
            })
            .collect(),
    }))
}

/// Return a concise metrics snapshot with document, chunk, and question counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsResponse>
where
    S: DocumentApi,
{
    let MetricsSnapshot {
        documents_ingested,
        chunks_ingested,
        questions_answered,
    } = service.metrics_snapshot();
    Json(MetricsResponse {
        documents_ingested,
        chunks_ingested,
        questions_answered,
    })
}

/// Response body for `GET /metrics`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricsResponse {
    documents_ingested: u64,
    chunks_ingested: u64,
    questions_answered: u64,
}

struct AppError(QueryError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

impl From<QueryError> for AppError {
    fn from(inner: QueryError) -> Self {
        Self(inner)
    }
}
