//! Vector store provider trait for storing and searching embeddings

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::types::{StoreRecord, StoreRow};

/// Keyword-style peek request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeekRequest {
    /// Maximum number of rows to return
    pub limit: usize,
}

/// Optional operations a store may offer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCapabilities {
    /// `peek(PeekRequest)` is implemented
    pub keyword_peek: bool,
}

/// Trait for a persistent vector collection
///
/// Implementations:
/// - `SqliteCollection`: Local SQLite file with exact cosine search
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Number of chunks in the collection
    async fn count(&self) -> Result<usize>;

    /// Sample rows using the keyword request shape
    ///
    /// Optional; stores that only know the positional shape leave the default.
    async fn peek(&self, _request: PeekRequest) -> Result<Vec<StoreRow>> {
        Err(Error::Unsupported("peek(PeekRequest)"))
    }

    /// Sample the first `n` rows (positional shape)
    async fn peek_n(&self, n: usize) -> Result<Vec<StoreRow>>;

    /// Nearest `k` chunks to `vector`, closest first, with distances
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<StoreRow>>;

    /// Insert or replace chunks by id
    async fn upsert(&self, records: &[StoreRecord]) -> Result<()>;

    /// Optional operations this store implements
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::default()
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}
