//! Question-answering server binary
//!
//! Run with: cargo run --bin scholar-rag-server

use scholar_rag::{config::Config, server::RagServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scholar_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var("SCHOLAR_RAG_CONFIG").ok().map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!(
        "  - Embedding model: {} ({} dims)",
        config.embedding.profile.model_name(),
        config.index_dimension()
    );
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!(
        "  - Chunking: {} words, {} overlap, {} max chars",
        config.chunking.split_length,
        config.chunking.split_overlap,
        config.chunking.max_chunk_chars
    );
    tracing::info!(
        "  - Max upload size: {}MB",
        config.server.max_upload_size / (1024 * 1024)
    );

    if config.index.api_key.is_none() {
        tracing::warn!("PINECONE_API_KEY is not set; index operations will fail");
    }
    if config.llm.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; answers will fall back to excerpts");
    }

    let server = RagServer::new(config)?;

    // Warm the embedding model in the background so the first upload is fast
    let warmup_state = server.state().clone();
    tokio::spawn(async move {
        warmup_state.warm_up().await;
    });

    tracing::info!("API: http://{}", server.address());
    tracing::info!("Endpoints:");
    tracing::info!("  POST   /api/upload       - Upload a document");
    tracing::info!("  POST   /api/answer       - Ask a question");
    tracing::info!("  GET    /api/status       - Document status");
    tracing::info!("  DELETE /api/document     - Delete the document");
    tracing::info!("  GET    /api/library      - List preloaded files");

    server.start().await?;

    Ok(())
}
