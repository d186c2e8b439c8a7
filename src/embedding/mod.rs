//! Embedding generation for chunks and questions.
//!
//! The pipeline only ever sees the [`EmbeddingClient`] trait; the OpenAI-backed
//! implementation issues HTTP requests directly so tests can point it at a mock
//! server. One call embeds a whole batch, and the response is returned in input
//! order. There is no retry: a failed call fails the operation that needed it.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::Config;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Provider could not be reached at all.
    #[error("Embedding provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed or did not match the input.
    #[error("Malformed embedding response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce one embedding vector per input text, in input order, in a single
    /// round trip. An empty input yields an empty output without a network call.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embed a single text; the one-element specialization of [`Self::embed`].
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let texts = [text.to_string()];
        let mut vectors = self.embed(&texts).await?;
        vectors.pop().ok_or_else(|| {
            EmbeddingError::InvalidResponse("provider returned no vectors".to_string())
        })
    }
}

/// Embedding client backed by the OpenAI embeddings API.
pub struct OpenAiEmbeddingClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiEmbeddingClient {
    /// Build a client for the configured OpenAI-compatible endpoint.
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.openai_base_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.embedding_model.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/embeddings", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingEntry>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingEntry {
    index: usize,
    embedding: Vec<f32>,
}

/// Pull the human-readable message out of an OpenAI error body, falling back to
/// the raw body when the shape is unexpected.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(model = %self.model, inputs = texts.len(), "Generating embeddings");
        let payload = json!({
            "model": self.model,
            "input": texts,
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                EmbeddingError::ProviderUnavailable(format!(
                    "failed to reach {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::GenerationFailed(format!(
                "OpenAI returned {status}: {}",
                error_message(&body)
            )));
        }

        let body: EmbeddingsResponse = response.json().await.map_err(|error| {
            EmbeddingError::InvalidResponse(format!("failed to decode embeddings: {error}"))
        })?;
        if body.data.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                body.data.len()
            )));
        }

        let mut data = body.data;
        data.sort_by_key(|entry| entry.index);
        Ok(data.into_iter().map(|entry| entry.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn test_client(server: &MockServer) -> OpenAiEmbeddingClient {
        OpenAiEmbeddingClient {
            http: Client::builder()
                .user_agent("docchat-test")
                .build()
                .expect("client"),
            base_url: server.base_url(),
            api_key: "sk-test".into(),
            model: "text-embedding-ada-002".into(),
        }
    }

    #[tokio::test]
    async fn embed_returns_vectors_in_input_order() {
        let server = MockServer::start_async().await;
        let client = test_client(&server);

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/embeddings")
                    .header("authorization", "Bearer sk-test")
                    .json_body(json!({
                        "model": "text-embedding-ada-002",
                        "input": ["alpha", "beta"],
                    }));
                then.status(200).json_body(json!({
                    "data": [
                        { "index": 1, "embedding": [0.2, 0.2] },
                        { "index": 0, "embedding": [0.1, 0.1] },
                    ]
                }));
            })
            .await;

        let vectors = client
            .embed(&["alpha".to_string(), "beta".to_string()])
            .await
            .expect("embeddings");

        mock.assert_async().await;
        assert_eq!(vectors, vec![vec![0.1, 0.1], vec![0.2, 0.2]]);
    }

    #[tokio::test]
    async fn embed_short_circuits_on_empty_input() {
        let server = MockServer::start_async().await;
        let client = test_client(&server);

        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/embeddings");
                then.status(200).json_body(json!({ "data": [] }));
            })
            .await;

        let vectors = client.embed(&[]).await.expect("empty batch");
        assert!(vectors.is_empty());
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn embed_surfaces_api_error_message() {
        let server = MockServer::start_async().await;
        let client = test_client(&server);

        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/embeddings");
                then.status(401)
                    .json_body(json!({ "error": { "message": "Incorrect API key provided" } }));
            })
            .await;

        let error = client
            .embed(&["alpha".to_string()])
            .await
            .expect_err("error response");

        match error {
            EmbeddingError::GenerationFailed(message) => {
                assert!(message.contains("401"));
                assert!(message.contains("Incorrect API key provided"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn embed_rejects_count_mismatch() {
        let server = MockServer::start_async().await;
        let client = test_client(&server);

        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/embeddings");
                then.status(200).json_body(json!({
                    "data": [ { "index": 0, "embedding": [0.5] } ]
                }));
            })
            .await;

        let error = client
            .embed(&["alpha".to_string(), "beta".to_string()])
            .await
            .expect_err("count mismatch");

        assert!(matches!(error, EmbeddingError::InvalidResponse(message) if message.contains("expected 2")));
    }

    #[tokio::test]
    async fn embed_rejects_malformed_body() {
        let server = MockServer::start_async().await;
        let client = test_client(&server);

        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/embeddings");
                then.status(200).body("not json");
            })
            .await;

        let error = client
            .embed(&["alpha".to_string()])
            .await
            .expect_err("malformed body");

        assert!(matches!(error, EmbeddingError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn embed_one_unwraps_the_single_vector() {
        let server = MockServer::start_async().await;
        let client = test_client(&server);

        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/embeddings")
                    .json_body_partial(r#"{ "input": ["what is this?"] }"#);
                then.status(200).json_body(json!({
                    "data": [ { "index": 0, "embedding": [0.3, 0.6] } ]
                }));
            })
            .await;

        let vector = client.embed_one("what is this?").await.expect("vector");
        assert_eq!(vector, vec![0.3, 0.6]);
    }
}
