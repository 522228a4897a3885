//! Request and response types for the HTTP surface

use serde::{Deserialize, Serialize};

use super::document::PageRef;

/// Citation shown to the client for one supporting chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// One-based page (non-integer pages pass through)
    pub page: Option<PageRef>,
    /// Origin URL
    pub url: Option<String>,
    /// Document identifier
    pub doc_id: Option<String>,
    /// Retrieval score
    pub score: Option<f64>,
    /// Source filename
    pub source: Option<String>,
    /// Chunk text, truncated for display
    pub snippet: String,
}

/// Result of answering one question
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// Answer text (the sentinel when no citations back it)
    pub text: String,
    /// Supporting citations
    pub citations: Vec<Citation>,
}

/// Body of `POST /ask` and `POST /debug/retrieve`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// The question to answer
    pub question: String,
}

/// Response from `POST /ask`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    /// Always true on success
    pub ok: bool,
    /// Grounded answer
    pub answer: String,
    /// Citations backing the answer
    pub citations: Vec<Citation>,
}

impl From<Answer> for AskResponse {
    fn from(answer: Answer) -> Self {
        Self {
            ok: true,
            answer: answer.text,
            citations: answer.citations,
        }
    }
}

/// Response from `POST /upload`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Always true on success
    pub ok: bool,
    /// Human-readable result
    pub message: String,
}

/// One row of a diagnostic retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieveHit {
    /// Full text length in characters
    pub text_len: usize,
    /// One-based page
    pub page: Option<PageRef>,
    /// Source filename
    pub source: Option<String>,
    /// Engine score, or store distance on the fallback path
    pub score: Option<f64>,
    /// Truncated text
    pub snippet: Option<String>,
}

/// Response from `POST /debug/retrieve`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveResponse {
    /// Hits, at most `k`
    pub hits: Vec<RetrieveHit>,
    /// Number of hits found
    pub count: usize,
}

/// One sampled row of the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeekRow {
    /// Position in the sample
    pub i: usize,
    /// Full text length in characters
    pub text_len: usize,
    /// One-based page
    pub page: Option<PageRef>,
    /// Source filename
    pub source: Option<String>,
    /// Truncated text
    pub snippet: Option<String>,
}

/// Response from `GET /debug/vdb`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeekResponse {
    /// Collection name
    pub collection: String,
    /// Total chunks in the collection
    pub count: usize,
    /// Sampled rows
    pub peek: Vec<PeekRow>,
}
