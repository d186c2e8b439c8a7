use anyhow::Context;
use docchat::{
    api,
    config::Config,
    embedding::OpenAiEmbeddingClient,
    logging,
    pinecone::PineconeClient,
    pipeline::DocumentService,
    synthesis::OpenAiChatClient,
};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let config = Config::load().context("Failed to load configuration")?;

    let http = reqwest::Client::builder()
        .user_agent(concat!("docchat/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let embedding_client = OpenAiEmbeddingClient::new(http.clone(), &config);
    let vector_store = PineconeClient::connect(http.clone(), &config)
        .await
        .context("Failed to connect to Pinecone")?;
    let synthesizer = OpenAiChatClient::new(http, &config);
    let service = DocumentService::new(
        Box::new(embedding_client),
        vector_store,
        Box::new(synthesizer),
        &config,
    );
    let app = api::create_router(Arc::new(service));

    let port = config.server_port.unwrap_or(DEFAULT_PORT);
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await?;
    Ok(())
}
