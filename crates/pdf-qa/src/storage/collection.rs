//! SQLite-backed vector collection
//!
//! One file per collection. Embeddings are stored as little-endian `f32`
//! blobs and searched exhaustively by cosine distance.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::vector_store::{PeekRequest, StoreCapabilities, VectorStoreProvider};
use crate::types::{ChunkMetadata, StoreRecord, StoreRow};

/// Persistent chunk collection
pub struct SqliteCollection {
    conn: Arc<Mutex<Connection>>,
    name: String,
}

impl SqliteCollection {
    /// Create or open the collection file at the given path
    pub fn open<P: AsRef<Path>>(path: P, name: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::vector_db(format!("Failed to open {}: {}", path.display(), e)))?;

        let collection = Self {
            conn: Arc::new(Mutex::new(conn)),
            name: name.into(),
        };
        collection.migrate()?;
        Ok(collection)
    }

    /// Create an in-memory collection
    pub fn in_memory(name: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::vector_db(format!("Failed to open in-memory store: {}", e)))?;

        let collection = Self {
            conn: Arc::new(Mutex::new(conn)),
            name: name.into(),
        };
        collection.migrate()?;
        Ok(collection)
    }

    /// Collection name
    pub fn collection_name(&self) -> &str {
        &self.name
    }

    /// Run schema migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            "#,
        )?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                document TEXT,
                embedding BLOB NOT NULL,
                metadata TEXT,
                created_at TEXT NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    fn count_sync(conn: &Connection) -> Result<usize> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn peek_sync(conn: &Connection, limit: usize) -> Result<Vec<StoreRow>> {
        let mut stmt =
            conn.prepare("SELECT document, metadata FROM chunks ORDER BY seq ASC LIMIT ?1")?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                let document: Option<String> = row.get(0)?;
                let metadata: Option<String> = row.get(1)?;
                Ok((document, metadata))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .map(|(document, metadata)| StoreRow {
                document,
                metadata: decode_metadata(metadata.as_deref()),
                distance: None,
            })
            .collect())
    }

    fn query_sync(conn: &Connection, vector: &[f32], k: usize) -> Result<Vec<StoreRow>> {
        let mut stmt = conn.prepare("SELECT document, embedding, metadata FROM chunks")?;
        let rows = stmt
            .query_map([], |row| {
                let document: Option<String> = row.get(0)?;
                let embedding: Vec<u8> = row.get(1)?;
                let metadata: Option<String> = row.get(2)?;
                Ok((document, embedding, metadata))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut scored = Vec::with_capacity(rows.len());
        for (document, blob, metadata) in rows {
            let embedding = decode_embedding(&blob)?;
            if embedding.len() != vector.len() {
                return Err(Error::vector_db(format!(
                    "Embedding dimension mismatch: query has {}, stored chunk has {}",
                    vector.len(),
                    embedding.len()
                )));
            }
            scored.push(StoreRow {
                document,
                metadata: decode_metadata(metadata.as_deref()),
                distance: Some(cosine_distance(vector, &embedding)),
            });
        }

        scored.sort_by(|a, b| {
            a.distance
                .unwrap_or(f32::MAX)
                .total_cmp(&b.distance.unwrap_or(f32::MAX))
        });
        scored.truncate(k);
        Ok(scored)
    }

    fn upsert_sync(conn: &mut Connection, records: &[StoreRecord]) -> Result<()> {
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO chunks (id, document, embedding, metadata, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                    document = excluded.document,
                    embedding = excluded.embedding,
                    metadata = excluded.metadata
                "#,
            )?;
            let now = Utc::now().to_rfc3339();
            for record in records {
                if record.embedding.is_empty() {
                    return Err(Error::vector_db(format!("Chunk {} has no embedding", record.id)));
                }
                let metadata = serde_json::to_string(&record.metadata)?;
                stmt.execute(params![
                    record.id,
                    record.document,
                    encode_embedding(&record.embedding),
                    metadata,
                    now
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[async_trait]
impl VectorStoreProvider for SqliteCollection {
    async fn count(&self) -> Result<usize> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || Self::count_sync(&conn.lock())).await?
    }

    async fn peek(&self, request: PeekRequest) -> Result<Vec<StoreRow>> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || Self::peek_sync(&conn.lock(), request.limit)).await?
    }

    async fn peek_n(&self, n: usize) -> Result<Vec<StoreRow>> {
        self.peek(PeekRequest { limit: n }).await
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<StoreRow>> {
        let conn = self.conn.clone();
        let vector = vector.to_vec();
        tokio::task::spawn_blocking(move || Self::query_sync(&conn.lock(), &vector, k)).await?
    }

    async fn upsert(&self, records: &[StoreRecord]) -> Result<()> {
        let conn = self.conn.clone();
        let records = records.to_vec();
        tokio::task::spawn_blocking(move || Self::upsert_sync(&mut conn.lock(), &records)).await?
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities { keyword_peek: true }
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_embedding(blob: &[u8]) -> Result<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(Error::vector_db(format!(
            "Corrupt embedding blob of {} bytes",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Unparseable metadata is treated as absent
fn decode_metadata(raw: Option<&str>) -> Option<ChunkMetadata> {
    raw.and_then(|m| match serde_json::from_str(m) {
        Ok(meta) => Some(meta),
        Err(e) => {
            tracing::debug!("Ignoring unreadable chunk metadata: {}", e);
            None
        }
    })
}

/// `1 - cosine_similarity`; zero vectors are at distance 1
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PageRef;

    fn record(id: &str, text: &str, embedding: Vec<f32>, page: i64) -> StoreRecord {
        StoreRecord {
            id: id.to_string(),
            document: text.to_string(),
            embedding,
            metadata: ChunkMetadata {
                page: Some(PageRef::Index(page)),
                source: Some("a.pdf".into()),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_upsert_count_and_peek_order() {
        let store = SqliteCollection::in_memory("test").unwrap();
        store
            .upsert(&[
                record("a-0-0", "first", vec![1.0, 0.0], 0),
                record("a-1-0", "second", vec![0.0, 1.0], 1),
            ])
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 2);

        let rows = store.peek_n(1).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].document.as_deref(), Some("first"));
        assert_eq!(
            rows[0].metadata.as_ref().unwrap().page,
            Some(PageRef::Index(0))
        );

        let keyword = store.peek(PeekRequest { limit: 5 }).await.unwrap();
        assert_eq!(keyword.len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_same_id_replaces() {
        let store = SqliteCollection::in_memory("test").unwrap();
        store.upsert(&[record("x", "old", vec![1.0, 0.0], 0)]).await.unwrap();
        store.upsert(&[record("x", "new", vec![1.0, 0.0], 0)]).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let rows = store.peek_n(5).await.unwrap();
        assert_eq!(rows[0].document.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_query_orders_by_distance() {
        let store = SqliteCollection::in_memory("test").unwrap();
        store
            .upsert(&[
                record("far", "far", vec![0.0, 1.0], 0),
                record("near", "near", vec![1.0, 0.1], 0),
                record("mid", "mid", vec![1.0, 1.0], 0),
            ])
            .await
            .unwrap();

        let rows = store.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].document.as_deref(), Some("near"));
        assert_eq!(rows[1].document.as_deref(), Some("mid"));
        assert!(rows[0].distance.unwrap() < rows[1].distance.unwrap());
    }

    #[tokio::test]
    async fn test_query_empty_collection() {
        let store = SqliteCollection::in_memory("test").unwrap();
        assert!(store.query(&[1.0, 0.0], 5).await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_error() {
        let store = SqliteCollection::in_memory("test").unwrap();
        store.upsert(&[record("a", "a", vec![1.0, 0.0], 0)]).await.unwrap();
        let err = store.query(&[1.0, 0.0, 0.0], 1).await.unwrap_err();
        assert!(matches!(err, Error::VectorDb(_)));
    }

    #[tokio::test]
    async fn test_reopen_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("coll.sqlite3");
        {
            let store = SqliteCollection::open(&path, "coll").unwrap();
            store.upsert(&[record("a", "kept", vec![0.5, 0.5], 2)]).await.unwrap();
        }
        let store = SqliteCollection::open(&path, "coll").unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.collection_name(), "coll");
    }

    #[test]
    fn test_foreign_metadata_keeps_readable_fields() {
        let raw = r#"{"source":"report.pdf","page":0,"score":"0.3"}"#;
        let meta = decode_metadata(Some(raw)).unwrap();
        assert_eq!(meta.source.as_deref(), Some("report.pdf"));
        assert_eq!(meta.page, Some(PageRef::Index(0)));
        assert!(meta.score.is_none());

        assert!(decode_metadata(Some("not json")).is_none());
    }

    #[test]
    fn test_embedding_blob_roundtrip_and_corruption() {
        let v = vec![0.25f32, -1.5, 3.0];
        assert_eq!(decode_embedding(&encode_embedding(&v)).unwrap(), v);
        assert!(decode_embedding(&[0u8; 5]).is_err());
    }

    #[test]
    fn test_cosine_distance_bounds() {
        assert!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0]).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }
}
