//! PDF Q&A server binary
//!
//! Run with: cargo run -p pdf-qa --bin pdf-qa-server

use pdf_qa::{
    config::{BackendProvider, RagConfig},
    server::RagServer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_qa=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (config, source) = RagConfig::resolve()?;

    tracing::info!("Configuration loaded from {}", source);
    tracing::info!("  - Backend: {:?}", config.backend);
    tracing::info!(
        "  - Collection: {} ({})",
        config.vector_db.collection_name,
        config.vector_db.collection_path().display()
    );
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - LLM model: {}", config.llm.generate_model);
    tracing::info!(
        "  - Chunk size: {} (overlap {})",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!("  - Top k: {}", config.retrieval.top_k);
    tracing::info!("  - CORS origin: {}", config.server.cors_origin);

    if config.backend == BackendProvider::Ollama {
        check_ollama(&config.llm.base_url).await;
    }

    let server = RagServer::new(config).await?;

    tracing::info!("Endpoints on http://{}:", server.address());
    tracing::info!("  POST /upload           - Upload a PDF");
    tracing::info!("  POST /ask              - Ask a question");
    tracing::info!("  GET  /debug/vdb        - Peek at stored chunks");
    tracing::info!("  POST /debug/retrieve   - Retrieval without an answer");

    server.start().await?;

    Ok(())
}

/// Warn early when the model server is unreachable; requests would fail later
async fn check_ollama(base_url: &str) {
    tracing::info!("Checking Ollama at {}...", base_url);
    let client = reqwest::Client::new();
    match client.get(format!("{}/api/tags", base_url)).send().await {
        Ok(resp) if resp.status().is_success() => {
            tracing::info!("Ollama is running");
        }
        _ => {
            tracing::warn!("Ollama not available at {}", base_url);
            tracing::warn!("  1. Start: ollama serve");
            tracing::warn!("  2. Pull models: ollama pull nomic-embed-text && ollama pull llama3.2:3b");
            tracing::warn!("  Or run without a model server: PDF_QA_BACKEND=offline");
        }
    }
}
