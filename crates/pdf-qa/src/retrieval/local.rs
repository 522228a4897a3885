//! In-process RAG engine over a vector store, an embedder, and an LLM

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::generation::prompt::{PromptBuilder, SENTINEL_ANSWER};
use crate::ingestion::{PdfParser, TextChunker};
use crate::providers::{EmbeddingProvider, LlmProvider, VectorStoreProvider};
use crate::types::{ChunkMetadata, DataType, PageRef, SourcedChunk, StoreRecord};

use super::engine::{
    EngineAnswer, EngineCapabilities, IngestSummary, QueryOptions, RetrievalEngine,
};

/// RAG engine: parse → chunk → embed → store, and retrieve → prompt → generate
pub struct LocalRagEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    store: Arc<dyn VectorStoreProvider>,
    chunker: TextChunker,
    top_k: usize,
}

impl LocalRagEngine {
    /// Create a new engine
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        store: Arc<dyn VectorStoreProvider>,
        chunker: TextChunker,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            llm,
            store,
            chunker,
            top_k: top_k.max(1),
        }
    }

    /// Nearest chunks to `question`, distance recorded as the score
    async fn nearest(&self, question: &str) -> Result<Vec<SourcedChunk>> {
        let vector = self.embedder.embed(question).await?;
        let rows = self.store.query(&vector, self.top_k).await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let text = row.document?;
                let mut metadata = row.metadata.unwrap_or_default();
                metadata.score = row.distance.map(f64::from);
                Some(SourcedChunk::new(text, metadata))
            })
            .collect())
    }
}

#[async_trait]
impl RetrievalEngine for LocalRagEngine {
    async fn add(
        &self,
        path: &Path,
        data_type: DataType,
        metadata: ChunkMetadata,
    ) -> Result<IngestSummary> {
        let start = Instant::now();
        let label = metadata
            .source
            .clone()
            .unwrap_or_else(|| path.display().to_string());

        let data = tokio::fs::read(path).await?;
        let parse_label = label.clone();
        let parsed =
            tokio::task::spawn_blocking(move || PdfParser::parse(&parse_label, &data)).await??;

        if parsed.is_empty() {
            return Err(Error::file_parse(&label, "No extractable text found"));
        }

        let doc_id = parsed.content_hash.clone();
        let mut texts = Vec::new();
        let mut records = Vec::new();

        for page in &parsed.pages {
            for (index, text) in self.chunker.chunk(&page.text).into_iter().enumerate() {
                records.push(StoreRecord {
                    id: format!("{}-{}-{}", doc_id, page.index, index),
                    document: text.clone(),
                    embedding: Vec::new(),
                    metadata: ChunkMetadata {
                        page: Some(PageRef::Index(i64::from(page.index))),
                        url: metadata.url.clone(),
                        doc_id: Some(doc_id.clone()),
                        score: None,
                        source: metadata.source.clone(),
                    },
                });
                texts.push(text);
            }
        }

        if records.is_empty() {
            return Err(Error::file_parse(&label, "No extractable text found"));
        }

        tracing::debug!(
            "{}: {}/{} pages with text, {} chunks ({})",
            label,
            parsed.pages.len(),
            parsed.total_pages,
            records.len(),
            data_type.as_str()
        );

        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != records.len() {
            return Err(Error::embedding(format!(
                "Expected {} embeddings, got {}",
                records.len(),
                embeddings.len()
            )));
        }
        for (record, embedding) in records.iter_mut().zip(embeddings) {
            record.embedding = embedding;
        }

        self.store.upsert(&records).await?;

        tracing::info!(
            "Stored {} chunks for {} (doc {}) in {}ms",
            records.len(),
            label,
            &doc_id[..12.min(doc_id.len())],
            start.elapsed().as_millis()
        );

        Ok(IngestSummary {
            doc_id,
            pages: parsed.pages.len(),
            chunks: records.len(),
        })
    }

    async fn query(&self, question: &str, options: &QueryOptions) -> Result<EngineAnswer> {
        let sources = self.nearest(question).await?;

        if sources.is_empty() {
            tracing::debug!("No chunks retrieved; skipping generation");
            return Ok(EngineAnswer {
                answer: SENTINEL_ANSWER.to_string(),
                sources: Vec::new(),
            });
        }

        let context = PromptBuilder::build_context(&sources);
        let prompt = PromptBuilder::build_question_prompt(question, &context);
        let answer = self.llm.generate(&options.system_prompt, &prompt).await?;

        Ok(EngineAnswer {
            answer,
            sources: if options.citations { sources } else { Vec::new() },
        })
    }

    async fn retrieve(&self, question: &str) -> Result<Vec<SourcedChunk>> {
        self.nearest(question).await
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities { retrieve: true }
    }

    fn name(&self) -> &str {
        "local"
    }
}
