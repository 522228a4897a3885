//! Collection inspection: count plus a sample of stored chunks

use std::sync::Arc;
use std::time::Duration;

use crate::error::{with_deadline, Error, Result};
use crate::generation::citation::peek_row;
use crate::providers::{PeekRequest, VectorStoreProvider};
use crate::types::{PeekResponse, StoreRow};

/// Smallest accepted peek size
pub const MIN_PEEK: i64 = 1;
/// Largest accepted peek size
pub const MAX_PEEK: i64 = 20;
/// Peek size when the client gives none
pub const DEFAULT_PEEK: i64 = 5;

/// Check a requested peek size
pub fn validate_peek(peek: i64) -> Result<usize> {
    if (MIN_PEEK..=MAX_PEEK).contains(&peek) {
        Ok(peek as usize)
    } else {
        Err(Error::OutOfRange {
            name: "peek",
            value: peek,
            min: MIN_PEEK,
            max: MAX_PEEK,
        })
    }
}

/// Which peek request shape the store is addressed with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeekShape {
    /// `peek(PeekRequest { limit })`
    Keyword,
    /// `peek_n(limit)`
    Positional,
}

impl PeekShape {
    /// Preferred shape for a store
    pub fn for_store(store: &dyn VectorStoreProvider) -> Self {
        if store.capabilities().keyword_peek {
            PeekShape::Keyword
        } else {
            PeekShape::Positional
        }
    }
}

/// Reads the collection count and a leading sample of rows
pub struct CollectionInspector {
    store: Arc<dyn VectorStoreProvider>,
    collection: String,
    shape: PeekShape,
    timeout: Duration,
}

impl CollectionInspector {
    /// Create an inspector, resolving the peek shape from the store's capabilities
    pub fn new(
        store: Arc<dyn VectorStoreProvider>,
        collection: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let shape = PeekShape::for_store(store.as_ref());
        tracing::debug!("Peeking {} with the {:?} request shape", store.name(), shape);
        Self {
            store,
            collection: collection.into(),
            shape,
            timeout,
        }
    }

    /// Shape in use
    pub fn shape(&self) -> PeekShape {
        self.shape
    }

    /// Count and up to `n` sampled rows
    pub async fn peek(&self, n: usize) -> Result<PeekResponse> {
        let (count, rows) = with_deadline(self.timeout, async {
            let count = self.store.count().await?;
            let rows = self.sample(n).await?;
            Ok::<_, Error>((count, rows))
        })
        .await
        .map_err(|e| {
            tracing::error!("Collection peek failed: {}", e);
            e
        })?;

        Ok(PeekResponse {
            collection: self.collection.clone(),
            count,
            peek: rows.iter().enumerate().map(|(i, row)| peek_row(i, row)).collect(),
        })
    }

    async fn sample(&self, n: usize) -> Result<Vec<StoreRow>> {
        match self.shape {
            PeekShape::Keyword => match self.store.peek(PeekRequest { limit: n }).await {
                Err(Error::Unsupported(_)) => self.store.peek_n(n).await,
                other => other,
            },
            PeekShape::Positional => self.store.peek_n(n).await,
        }
    }
}
