//! HTTP client wrapper for interacting with Pinecone.

use reqwest::{Client, Method};
use serde_json::json;

use crate::config::Config;
use crate::pinecone::{
    filters::document_filter,
    types::{DescribeIndexResponse, PineconeError, QueryMatch, QueryResponseBody, VectorRecord},
};

/// Lightweight HTTP client bound to one Pinecone index.
///
/// The data-plane host is resolved once at construction; every subsequent call
/// is a single request against that host with the `Api-Key` header attached.
pub struct PineconeClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
}

impl PineconeClient {
    /// Resolve the index host and build a client for it.
    ///
    /// When `pinecone_index_host` is configured it is used directly; otherwise
    /// the controller API for the configured environment is asked to describe
    /// the index and its `status.host` becomes the base URL.
    pub async fn connect(http: Client, config: &Config) -> Result<Self, PineconeError> {
        let base_url = match &config.pinecone_index_host {
            Some(host) => normalize_base_url(host).map_err(PineconeError::InvalidUrl)?,
            None => {
                let controller = format!(
                    "https://controller.{}.pinecone.io",
                    config.pinecone_environment
                );
                let host = describe_index_host(
                    &http,
                    &controller,
                    &config.pinecone_api_key,
                    &config.pinecone_index_name,
                )
                .await?;
                normalize_base_url(&host).map_err(PineconeError::InvalidUrl)?
            }
        };

        tracing::debug!(
            index = %config.pinecone_index_name,
            url = %base_url,
            "Initialized Pinecone HTTP client"
        );

        Ok(Self {
            client: http,
            base_url,
            api_key: config.pinecone_api_key.clone(),
        })
    }

    /// Upsert one batch of records.
    ///
    /// The caller is responsible for batching; this method sends whatever it is
    /// given in a single request. An empty slice is a no-op.
    pub async fn upsert(&self, vectors: &[VectorRecord]) -> Result<(), PineconeError> {
        if vectors.is_empty() {
            return Ok(());
        }

        let response = self
            .request(Method::POST, "vectors/upsert")
            .json(&json!({ "vectors": vectors }))
            .send()
            .await?;

        let count = vectors.len();
        self.ensure_success(response, || {
            tracing::debug!(vectors = count, "Vectors upserted");
        })
        .await
    }

    /// Run a similarity query restricted to one document's chunks.
    ///
    /// Requests both metadata and raw values, and returns matches exactly in
    /// the order the store ranked them.
    pub async fn query(
        &self,
        vector: Vec<f32>,
        top_k: usize,
        document_name: &str,
    ) -> Result<Vec<QueryMatch>, PineconeError> {
        let body = json!({
            "vector": vector,
            "topK": top_k,
            "filter": document_filter(document_name),
            "includeMetadata": true,
            "includeValues": true,
        });

        let response = self
            .request(Method::POST, "query")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = PineconeError::UnexpectedStatus { status, body };
            tracing::error!(document = document_name, error = %error, "Pinecone query failed");
            return Err(error);
        }

        let payload: QueryResponseBody = response.json().await?;
        Ok(payload.matches)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        self.client
            .request(method, url)
            .header("Api-Key", &self.api_key)
    }

    async fn ensure_success<F>(
        &self,
        response: reqwest::Response,
        on_success: F,
    ) -> Result<(), PineconeError>
    where
        F: FnOnce(),
    {
        if response.status().is_success() {
            on_success();
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = PineconeError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Pinecone request failed");
            Err(error)
        }
    }
}

/// Ask the controller plane for the index's data-plane host.
pub(crate) async fn describe_index_host(
    client: &Client,
    controller_url: &str,
    api_key: &str,
    index_name: &str,
) -> Result<String, PineconeError> {
    let url = format_endpoint(controller_url, &format!("databases/{index_name}"));
    let response = client
        .get(url)
        .header("Api-Key", api_key)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let error = PineconeError::UnexpectedStatus { status, body };
        tracing::error!(index = index_name, error = %error, "Failed to describe index");
        return Err(error);
    }

    let described: DescribeIndexResponse = response.json().await?;
    if !described.status.ready {
        tracing::warn!(index = index_name, "Pinecone index is not ready yet");
    }

    described
        .status
        .host
        .filter(|host| !host.is_empty())
        .ok_or_else(|| PineconeError::IndexUnavailable(index_name.to_string()))
}

/// Normalize a configured URL or bare host into an absolute base URL.
fn normalize_base_url(url: &str) -> Result<String, String> {
    let candidate = if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{url}")
    };
    let mut parsed = reqwest::Url::parse(&candidate).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
