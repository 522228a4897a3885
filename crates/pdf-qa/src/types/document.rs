//! Chunk and metadata types with source tracking for citations

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Page reference stored with a chunk
///
/// Integer pages are zero-based in storage and shown one-based to clients.
/// Anything else the store hands back is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageRef {
    /// Zero-based page index
    Index(i64),
    /// Non-integer page value
    Other(serde_json::Value),
}

impl PageRef {
    /// Client-facing page: integer pages become one-based
    pub fn display(&self) -> PageRef {
        match self {
            PageRef::Index(page) => PageRef::Index(page.saturating_add(1)),
            PageRef::Other(value) => PageRef::Other(value.clone()),
        }
    }
}

/// Metadata attached to every stored chunk
///
/// All fields are nullable; stores written by other tools may omit any of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkMetadata {
    /// Page the chunk was extracted from (zero-based)
    pub page: Option<PageRef>,
    /// Origin URL, if the document came from one
    #[serde(deserialize_with = "lenient")]
    pub url: Option<String>,
    /// Identifier of the ingested document
    #[serde(deserialize_with = "lenient")]
    pub doc_id: Option<String>,
    /// Similarity/distance assigned at retrieval time
    #[serde(deserialize_with = "lenient")]
    pub score: Option<f64>,
    /// Original filename of the uploaded document
    #[serde(deserialize_with = "lenient")]
    pub source: Option<String>,
}

/// A value of the wrong type reads as absent instead of failing the record
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl ChunkMetadata {
    /// Metadata carrying only the source filename
    pub fn with_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Default::default()
        }
    }

    /// Client-facing page for this chunk
    pub fn display_page(&self) -> Option<PageRef> {
        self.page.as_ref().map(PageRef::display)
    }
}

/// Ingestion data type hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// PDF file on disk
    PdfFile,
}

impl DataType {
    /// Wire name of the data type
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::PdfFile => "pdf_file",
        }
    }
}

/// A retrieved chunk: text plus the metadata it was stored with
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedChunk {
    /// Chunk text
    pub text: String,
    /// Chunk metadata
    pub metadata: ChunkMetadata,
}

impl SourcedChunk {
    /// Create a sourced chunk
    pub fn new(text: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}

/// A chunk ready to be written into the vector store
#[derive(Debug, Clone)]
pub struct StoreRecord {
    /// Stable chunk id (re-upserting the same id replaces the row)
    pub id: String,
    /// Chunk text
    pub document: String,
    /// Embedding vector
    pub embedding: Vec<f32>,
    /// Chunk metadata
    pub metadata: ChunkMetadata,
}

/// A raw row returned by the vector store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreRow {
    /// Stored text, if any
    pub document: Option<String>,
    /// Stored metadata, if any
    pub metadata: Option<ChunkMetadata>,
    /// Distance to the query vector (query results only)
    pub distance: Option<f32>,
}

impl StoreRow {
    /// Metadata or an empty record
    pub fn metadata_or_default(&self) -> ChunkMetadata {
        self.metadata.clone().unwrap_or_default()
    }

    /// Text length in characters, zero when absent
    pub fn text_len(&self) -> usize {
        self.document
            .as_deref()
            .map(|d| d.chars().count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_page_is_one_based() {
        assert_eq!(PageRef::Index(0).display(), PageRef::Index(1));
        assert_eq!(PageRef::Index(41).display(), PageRef::Index(42));
    }

    #[test]
    fn test_non_integer_page_passes_through() {
        let page: PageRef = serde_json::from_value(json!("iv")).unwrap();
        assert_eq!(page.display(), PageRef::Other(json!("iv")));

        let page: PageRef = serde_json::from_value(json!(2.5)).unwrap();
        assert_eq!(page.display(), PageRef::Other(json!(2.5)));
    }

    #[test]
    fn test_metadata_missing_fields_are_null() {
        let meta: ChunkMetadata = serde_json::from_value(json!({"source": "a.pdf"})).unwrap();
        assert_eq!(meta.source.as_deref(), Some("a.pdf"));
        assert!(meta.page.is_none());
        assert!(meta.display_page().is_none());

        let meta: ChunkMetadata =
            serde_json::from_value(json!({"page": 3, "extra": true})).unwrap();
        assert_eq!(meta.display_page(), Some(PageRef::Index(4)));
    }

    #[test]
    fn test_mistyped_field_keeps_the_rest() {
        let meta: ChunkMetadata = serde_json::from_value(json!({
            "source": "report.pdf",
            "page": 0,
            "score": "0.3",
            "doc_id": 7
        }))
        .unwrap();

        assert_eq!(meta.source.as_deref(), Some("report.pdf"));
        assert_eq!(meta.page, Some(PageRef::Index(0)));
        assert!(meta.score.is_none());
        assert!(meta.doc_id.is_none());
    }

    #[test]
    fn test_store_row_text_len_counts_chars() {
        let row = StoreRow {
            document: Some("héllo".into()),
            ..Default::default()
        };
        assert_eq!(row.text_len(), 5);
        assert_eq!(StoreRow::default().text_len(), 0);
    }
}
