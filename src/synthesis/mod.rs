//! Answer synthesis from retrieved context.
//!
//! The query pipeline hands every retrieved chunk to the model in one prompt
//! (the "stuff" strategy) together with the caller's question. A single chat
//! completion produces the answer; there is no retry and no streaming. The
//! prompt instructs the model to admit ignorance rather than invent an answer
//! when the context does not cover the question.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::Config;

/// Errors surfaced while synthesizing an answer.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Provider could not be reached at all.
    #[error("Chat provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to synthesize answer: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed chat response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by answer-synthesis providers.
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    /// Generate an answer to `question` grounded in `context`.
    async fn synthesize(&self, context: &str, question: &str) -> Result<String, SynthesisError>;
}

/// Answer synthesizer backed by the OpenAI chat completions API.
pub struct OpenAiChatClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
}

impl OpenAiChatClient {
    /// Build a client for the configured OpenAI-compatible endpoint.
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.openai_base_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.chat_model.clone(),
            temperature: config.chat_temperature,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Use the following pieces of context to answer the question at the end. \
         If you don't know the answer, just say that you don't know, don't try to \
         make up an answer.\n\n{context}\n\nQuestion: {question}\nHelpful Answer:"
    )
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[async_trait]
impl AnswerSynthesizer for OpenAiChatClient {
    async fn synthesize(&self, context: &str, question: &str) -> Result<String, SynthesisError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": build_prompt(context, question) }
            ],
            "temperature": self.temperature,
        });

        tracing::debug!(
            model = %self.model,
            context_chars = context.chars().count(),
            "Requesting answer synthesis"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SynthesisError::ProviderUnavailable(format!(
                    "failed to reach {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::GenerationFailed(format!(
                "OpenAI returned {status}: {body}"
            )));
        }

        let body: ChatResponse = response.json().await.map_err(|error| {
            SynthesisError::InvalidResponse(format!("failed to decode chat response: {error}"))
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| SynthesisError::InvalidResponse("response carried no answer".into()))
    }
}
