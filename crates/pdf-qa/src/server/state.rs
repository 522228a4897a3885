//! Application state for the PDF Q&A server

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{BackendProvider, RagConfig};
use crate::error::Result;
use crate::generation::AnswerSynthesizer;
use crate::ingestion::{TextChunker, UploadIngestor};
use crate::providers::ollama::ollama_providers;
use crate::providers::{
    EmbeddingProvider, ExtractiveLlm, HashEmbedder, LlmProvider, VectorStoreProvider,
};
use crate::retrieval::{CollectionInspector, DiagnosticRetriever, LocalRagEngine, RetrievalEngine};
use crate::storage::SqliteCollection;

/// Shared application state
///
/// Built once at startup; handlers only read from it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Retrieval engine behind every operation
    engine: Arc<dyn RetrievalEngine>,
    /// Embedder, also used directly by the diagnostic fallback
    embedder: Arc<dyn EmbeddingProvider>,
    /// Upload → engine ingestion
    ingestor: UploadIngestor,
    /// Grounded answers
    synthesizer: AnswerSynthesizer,
    /// Retrieval without synthesis
    diagnostic: DiagnosticRetriever,
    /// Collection count and sample
    inspector: CollectionInspector,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Create application state from configuration
    pub async fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing PDF Q&A application state...");

        let path = config.vector_db.collection_path();
        let store: Arc<dyn VectorStoreProvider> = Arc::new(SqliteCollection::open(
            &path,
            config.vector_db.collection_name.clone(),
        )?);
        tracing::info!("Vector store opened at {}", path.display());

        let embedder: Arc<dyn EmbeddingProvider>;
        let llm: Arc<dyn LlmProvider>;
        match config.backend {
            BackendProvider::Ollama => {
                let (ollama_embedder, ollama_llm) = ollama_providers(&config)?;
                tracing::info!(
                    "Ollama backend at {} ({} for embeddings, {} for answers)",
                    config.llm.base_url,
                    config.llm.embed_model,
                    config.llm.generate_model
                );
                embedder = Arc::new(ollama_embedder);
                llm = Arc::new(ollama_llm);
            }
            BackendProvider::Offline => {
                tracing::info!("Offline backend (hashing embedder, extractive answers)");
                embedder = Arc::new(HashEmbedder::new(config.embeddings.dimensions));
                llm = Arc::new(ExtractiveLlm::new());
            }
        }

        let engine: Arc<dyn RetrievalEngine> = Arc::new(LocalRagEngine::new(
            embedder.clone(),
            llm,
            store.clone(),
            TextChunker::from_config(&config.chunking),
            config.retrieval.top_k,
        ));

        Ok(Self::from_parts(config, engine, embedder, store))
    }

    /// Assemble state from already-built components
    pub fn from_parts(
        config: RagConfig,
        engine: Arc<dyn RetrievalEngine>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Self {
        let timeout = Duration::from_secs(config.server.request_timeout_secs);

        let inspector = CollectionInspector::new(
            store.clone(),
            config.vector_db.collection_name.clone(),
            timeout,
        );
        let diagnostic =
            DiagnosticRetriever::new(engine.clone(), embedder.clone(), store, timeout);

        Self {
            inner: Arc::new(AppStateInner {
                ingestor: UploadIngestor::new(engine.clone(), timeout),
                synthesizer: AnswerSynthesizer::new(engine.clone(), timeout),
                diagnostic,
                inspector,
                engine,
                embedder,
                config,
                ready: RwLock::new(true),
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the retrieval engine
    pub fn engine(&self) -> &Arc<dyn RetrievalEngine> {
        &self.inner.engine
    }

    /// Get the embedder
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    /// Get the upload ingestor
    pub fn ingestor(&self) -> &UploadIngestor {
        &self.inner.ingestor
    }

    /// Get the answer synthesizer
    pub fn synthesizer(&self) -> &AnswerSynthesizer {
        &self.inner.synthesizer
    }

    /// Get the diagnostic retriever
    pub fn diagnostic(&self) -> &DiagnosticRetriever {
        &self.inner.diagnostic
    }

    /// Get the collection inspector
    pub fn inspector(&self) -> &CollectionInspector {
        &self.inner.inspector
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
