use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_CHAT_TEMPERATURE: f64 = 0.3;
const DEFAULT_CHUNK_MAX_SIZE: usize = 1000;
const DEFAULT_UPSERT_BATCH_SIZE: usize = 100;
const DEFAULT_QUERY_TOP_K: usize = 10;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for the document search server.
///
/// Loaded once in `main` and handed to the components that need it; nothing in
/// the crate reads the environment after startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key used for both embeddings and chat completions.
    pub openai_api_key: String,
    /// Base URL of the OpenAI-compatible API.
    pub openai_base_url: String,
    /// Embedding model identifier; its dimensionality must match the index.
    pub embedding_model: String,
    /// Chat model used to synthesize answers.
    pub chat_model: String,
    /// Sampling temperature for answer synthesis.
    pub chat_temperature: f64,
    /// API key for the Pinecone index.
    pub pinecone_api_key: String,
    /// Pinecone environment (region) hosting the index, e.g. `us-east1-gcp`.
    pub pinecone_environment: String,
    /// Name of the Pinecone index used for document storage.
    pub pinecone_index_name: String,
    /// Optional data-plane host override; skips controller resolution when set.
    pub pinecone_index_host: Option<String>,
    /// Maximum chunk size, in characters, produced by the text splitter.
    pub chunk_max_size: usize,
    /// Maximum number of vectors sent per upsert call.
    pub upsert_batch_size: usize,
    /// Number of matches requested per similarity query.
    pub query_top_k: usize,
    /// Separator inserted between retrieved chunks when building prompt context.
    pub context_separator: String,
    /// Timeout applied to every outbound HTTP request, in seconds.
    pub http_timeout_secs: u64,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl Config {
    /// Load `.env` (when present) and then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self::from_env()?;
        tracing::debug!(
            index = %config.pinecone_index_name,
            environment = %config.pinecone_environment,
            embedding_model = %config.embedding_model,
            chunk_max_size = config.chunk_max_size,
            upsert_batch_size = config.upsert_batch_size,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            openai_api_key: load_env("OPENAI_API_KEY")?,
            openai_base_url: load_env_optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            embedding_model: load_env_optional("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            chat_model: load_env_optional("CHAT_MODEL")
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            chat_temperature: parse_env_optional("CHAT_TEMPERATURE")?
                .unwrap_or(DEFAULT_CHAT_TEMPERATURE),
            pinecone_api_key: load_env("PINECONE_API_KEY")?,
            pinecone_environment: load_env("PINECONE_ENVIRONMENT")?,
            pinecone_index_name: load_env("PINECONE_INDEX_NAME")?,
            pinecone_index_host: load_env_optional("PINECONE_INDEX_HOST"),
            chunk_max_size: require_non_zero(
                parse_env_optional("CHUNK_MAX_SIZE")?.unwrap_or(DEFAULT_CHUNK_MAX_SIZE),
                "CHUNK_MAX_SIZE",
            )?,
            upsert_batch_size: require_non_zero(
                parse_env_optional("UPSERT_BATCH_SIZE")?.unwrap_or(DEFAULT_UPSERT_BATCH_SIZE),
                "UPSERT_BATCH_SIZE",
            )?,
            query_top_k: require_non_zero(
                parse_env_optional("QUERY_TOP_K")?.unwrap_or(DEFAULT_QUERY_TOP_K),
                "QUERY_TOP_K",
            )?,
            // Whitespace is a legitimate separator, so no trim-empty filtering here.
            context_separator: env::var("CONTEXT_SEPARATOR").unwrap_or_default(),
            http_timeout_secs: parse_env_optional("HTTP_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            server_port: parse_env_optional("SERVER_PORT")?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env_optional<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

fn require_non_zero(value: usize, key: &str) -> Result<usize, ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue(key.to_string()));
    }
    Ok(value)
}
