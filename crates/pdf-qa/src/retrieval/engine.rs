//! Capability interface of the retrieval engine
//!
//! `add` and `query` are required. `retrieve` is optional: engines that do not
//! offer retrieval without synthesis keep the default, and the diagnostic path
//! falls back to querying the vector store directly.

use async_trait::async_trait;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{ChunkMetadata, DataType, SourcedChunk};

/// Options for a combined retrieve + synthesize call
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Return the chunks the answer was synthesized from
    pub citations: bool,
    /// Grounding instruction for the generator
    pub system_prompt: String,
}

/// Answer text plus the chunks it was derived from
#[derive(Debug, Clone, Default)]
pub struct EngineAnswer {
    /// Synthesized answer
    pub answer: String,
    /// Supporting chunks (empty when citations were not requested)
    pub sources: Vec<SourcedChunk>,
}

/// Outcome of ingesting one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    /// Identifier derived from the file contents
    pub doc_id: String,
    /// Pages with extractable text
    pub pages: usize,
    /// Chunks written to the store
    pub chunks: usize,
}

/// Optional operations an engine implements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineCapabilities {
    /// `retrieve` is implemented
    pub retrieve: bool,
}

/// Retrieval-augmented generation engine
#[async_trait]
pub trait RetrievalEngine: Send + Sync {
    /// Extract, chunk, embed, and store a file; every chunk carries `metadata`
    async fn add(
        &self,
        path: &Path,
        data_type: DataType,
        metadata: ChunkMetadata,
    ) -> Result<IngestSummary>;

    /// Retrieve context for `question` and synthesize an answer from it
    async fn query(&self, question: &str, options: &QueryOptions) -> Result<EngineAnswer>;

    /// Retrieve ranked chunks for `question` without synthesis
    async fn retrieve(&self, _question: &str) -> Result<Vec<SourcedChunk>> {
        Err(Error::Unsupported("retrieve"))
    }

    /// Optional operations this engine implements
    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities::default()
    }

    /// Get engine name for logging
    fn name(&self) -> &str;
}
