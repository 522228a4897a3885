//! Retrieval without synthesis, for debugging what the store returns
//!
//! The engine's own `retrieve` is tried first when the engine advertises it.
//! If it is missing or fails for any reason, the question is embedded and the
//! vector store queried directly; those hits carry the raw store distance as
//! their score. Both attempts share a single request deadline.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{with_deadline, Error, Result};
use crate::generation::citation::{hit_from_chunk, hit_from_store_row};
use crate::providers::{EmbeddingProvider, VectorStoreProvider};
use crate::types::{RetrieveHit, RetrieveResponse};

use super::engine::RetrievalEngine;

/// Smallest accepted `k`
pub const MIN_K: i64 = 1;
/// Largest accepted `k`
pub const MAX_K: i64 = 10;
/// `k` when the client gives none
pub const DEFAULT_K: i64 = 5;

/// Check a requested hit count
pub fn validate_k(k: i64) -> Result<usize> {
    if (MIN_K..=MAX_K).contains(&k) {
        Ok(k as usize)
    } else {
        Err(Error::OutOfRange {
            name: "k",
            value: k,
            min: MIN_K,
            max: MAX_K,
        })
    }
}

/// Diagnostic retriever with a direct-store fallback
pub struct DiagnosticRetriever {
    engine: Arc<dyn RetrievalEngine>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    engine_retrieve: bool,
    timeout: Duration,
}

impl DiagnosticRetriever {
    /// Create a retriever
    pub fn new(
        engine: Arc<dyn RetrievalEngine>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        timeout: Duration,
    ) -> Self {
        let engine_retrieve = engine.capabilities().retrieve;
        if !engine_retrieve {
            tracing::info!(
                "Engine {} has no retrieve; diagnostics query the store directly",
                engine.name()
            );
        }

        Self {
            engine,
            embedder,
            store,
            engine_retrieve,
            timeout,
        }
    }

    /// Up to `k` hits for `question`
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<RetrieveResponse> {
        with_deadline(self.timeout, self.attempt(question, k))
            .await
            .map_err(|e| {
                tracing::error!("Diagnostic retrieval failed: {}", e);
                e
            })
    }

    async fn attempt(&self, question: &str, k: usize) -> Result<RetrieveResponse> {
        if self.engine_retrieve {
            match self.primary(question, k).await {
                Ok(response) => return Ok(response),
                Err(e) => tracing::warn!(
                    "Engine retrieval via {} failed ({}); querying store directly",
                    self.engine.name(),
                    e
                ),
            }
        }
        self.fallback(question, k).await
    }

    async fn primary(&self, question: &str, k: usize) -> Result<RetrieveResponse> {
        let chunks = self.engine.retrieve(question).await?;
        let count = chunks.len();
        let hits: Vec<RetrieveHit> = chunks.iter().take(k).map(hit_from_chunk).collect();

        Ok(RetrieveResponse { hits, count })
    }

    async fn fallback(&self, question: &str, k: usize) -> Result<RetrieveResponse> {
        let vector = self.embedder.embed(question).await?;
        let rows = self.store.query(&vector, k).await?;

        let hits: Vec<RetrieveHit> = rows.iter().map(hit_from_store_row).collect();
        let count = hits.len();

        Ok(RetrieveResponse { hits, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::HashEmbedder;
    use crate::retrieval::{EngineAnswer, EngineCapabilities, IngestSummary, QueryOptions};
    use crate::storage::SqliteCollection;
    use crate::types::{ChunkMetadata, DataType, PageRef, SourcedChunk, StoreRecord};
    use async_trait::async_trait;
    use std::path::Path;

    /// Engine whose retrieve is scripted; `None` keeps the unsupported default
    struct StubEngine {
        hits: Option<Result<Vec<SourcedChunk>>>,
    }

    #[async_trait]
    impl RetrievalEngine for StubEngine {
        async fn add(&self, _: &Path, _: DataType, _: ChunkMetadata) -> Result<IngestSummary> {
            unreachable!("not used by diagnostic retrieval")
        }

        async fn query(&self, _: &str, _: &QueryOptions) -> Result<EngineAnswer> {
            unreachable!("not used by diagnostic retrieval")
        }

        async fn retrieve(&self, _: &str) -> Result<Vec<SourcedChunk>> {
            match &self.hits {
                None => Err(Error::Unsupported("retrieve")),
                Some(Ok(hits)) => Ok(hits.clone()),
                Some(Err(_)) => Err(Error::vector_db("index corrupted")),
            }
        }

        fn capabilities(&self) -> EngineCapabilities {
            EngineCapabilities {
                retrieve: self.hits.is_some(),
            }
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    /// Engine that advertises `retrieve` but never answers
    struct HangingEngine;

    #[async_trait]
    impl RetrievalEngine for HangingEngine {
        async fn add(&self, _: &Path, _: DataType, _: ChunkMetadata) -> Result<IngestSummary> {
            unreachable!("not used by diagnostic retrieval")
        }

        async fn query(&self, _: &str, _: &QueryOptions) -> Result<EngineAnswer> {
            unreachable!("not used by diagnostic retrieval")
        }

        async fn retrieve(&self, _: &str) -> Result<Vec<SourcedChunk>> {
            std::future::pending().await
        }

        fn capabilities(&self) -> EngineCapabilities {
            EngineCapabilities { retrieve: true }
        }

        fn name(&self) -> &str {
            "hanging"
        }
    }

    /// Engine that does not advertise `retrieve`; calling it is a bug
    struct Unadvertised;

    #[async_trait]
    impl RetrievalEngine for Unadvertised {
        async fn add(&self, _: &Path, _: DataType, _: ChunkMetadata) -> Result<IngestSummary> {
            unreachable!("not used by diagnostic retrieval")
        }

        async fn query(&self, _: &str, _: &QueryOptions) -> Result<EngineAnswer> {
            unreachable!("not used by diagnostic retrieval")
        }

        async fn retrieve(&self, _: &str) -> Result<Vec<SourcedChunk>> {
            unreachable!("retrieve is not advertised")
        }

        fn name(&self) -> &str {
            "unadvertised"
        }
    }

    fn chunk(text: &str, page: i64, score: f64) -> SourcedChunk {
        SourcedChunk::new(
            text,
            ChunkMetadata {
                page: Some(PageRef::Index(page)),
                source: Some("a.pdf".into()),
                score: Some(score),
                ..Default::default()
            },
        )
    }

    async fn seeded_store(embedder: &HashEmbedder) -> Arc<SqliteCollection> {
        let store = Arc::new(SqliteCollection::in_memory("t").unwrap());
        let mut records = Vec::new();
        for (i, text) in ["Revenue grew 20% in Q2.", "Soup is served daily."].iter().enumerate() {
            records.push(StoreRecord {
                id: format!("d-{}-0", i),
                document: text.to_string(),
                embedding: embedder.embed(text).await.unwrap(),
                metadata: ChunkMetadata {
                    page: Some(PageRef::Index(i as i64)),
                    source: Some("report.pdf".into()),
                    ..Default::default()
                },
            });
        }
        store.upsert(&records).await.unwrap();
        store
    }

    fn retriever(engine: StubEngine, store: Arc<SqliteCollection>) -> DiagnosticRetriever {
        DiagnosticRetriever::new(
            Arc::new(engine),
            Arc::new(HashEmbedder::default()),
            store,
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_validate_k_bounds() {
        assert_eq!(validate_k(1).unwrap(), 1);
        assert_eq!(validate_k(10).unwrap(), 10);
        assert!(matches!(validate_k(0), Err(Error::OutOfRange { name: "k", .. })));
        assert!(matches!(validate_k(11), Err(Error::OutOfRange { .. })));
        assert!(validate_k(-3).is_err());
    }

    #[tokio::test]
    async fn test_primary_truncates_but_counts_all() {
        let hits: Vec<SourcedChunk> = (0..7).map(|i| chunk("text", i, 0.5)).collect();
        let store = Arc::new(SqliteCollection::in_memory("t").unwrap());
        let r = retriever(StubEngine { hits: Some(Ok(hits)) }, store);

        let response = r.retrieve("q", 3).await.unwrap();
        assert_eq!(response.hits.len(), 3);
        assert_eq!(response.count, 7);
        assert_eq!(response.hits[0].page, Some(PageRef::Index(1)));
        assert_eq!(response.hits[0].score, Some(0.5));
    }

    #[tokio::test]
    async fn test_missing_retrieve_falls_back_to_store() {
        let embedder = HashEmbedder::default();
        let store = seeded_store(&embedder).await;
        let r = retriever(StubEngine { hits: None }, store);

        let response = r.retrieve("revenue growth", 1).await.unwrap();
        assert_eq!(response.count, 1);
        assert_eq!(response.hits.len(), 1);
        assert_eq!(response.hits[0].page, Some(PageRef::Index(1)));
        assert_eq!(response.hits[0].source.as_deref(), Some("report.pdf"));
        // raw distance, not a similarity
        let score = response.hits[0].score.unwrap();
        assert!((0.0..1.0).contains(&score));
    }

    #[tokio::test]
    async fn test_failing_retrieve_falls_back_to_store() {
        let embedder = HashEmbedder::default();
        let store = seeded_store(&embedder).await;
        let r = retriever(
            StubEngine {
                hits: Some(Err(Error::vector_db("x"))),
            },
            store,
        );

        let response = r.retrieve("revenue", 5).await.unwrap();
        assert_eq!(response.count, 2);
        assert!(response.hits.iter().all(|h| h.score.is_some()));
    }

    #[tokio::test]
    async fn test_unadvertised_retrieve_is_never_called() {
        let embedder = HashEmbedder::default();
        let store = seeded_store(&embedder).await;
        let r = DiagnosticRetriever::new(
            Arc::new(Unadvertised),
            Arc::new(embedder),
            store,
            Duration::from_secs(5),
        );

        let response = r.retrieve("revenue", 2).await.unwrap();
        assert_eq!(response.count, 2);
    }

    #[tokio::test]
    async fn test_hanging_engine_is_bounded_by_one_deadline() {
        let embedder = HashEmbedder::default();
        let store = seeded_store(&embedder).await;
        let r = DiagnosticRetriever::new(
            Arc::new(HangingEngine),
            Arc::new(embedder),
            store,
            Duration::from_millis(100),
        );

        let err = r.retrieve("revenue", 2).await.unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[tokio::test]
    async fn test_fallback_on_empty_store() {
        let store = Arc::new(SqliteCollection::in_memory("t").unwrap());
        let r = retriever(StubEngine { hits: None }, store);

        let response = r.retrieve("anything", 5).await.unwrap();
        assert!(response.hits.is_empty());
        assert_eq!(response.count, 0);
    }
}
