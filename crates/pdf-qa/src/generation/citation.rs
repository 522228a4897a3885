//! Citation construction and snippet truncation

use crate::types::{Citation, PeekRow, RetrieveHit, SourcedChunk, StoreRow};

/// Snippet length for answer citations and diagnostic retrieval
pub const CITATION_SNIPPET_CHARS: usize = 300;
/// Snippet length for collection peeks
pub const PEEK_SNIPPET_CHARS: usize = 200;
/// Appended to snippets that were cut short
pub const TRUNCATION_MARKER: &str = "…";

/// Truncate `text` to `max_chars` characters, appending the marker when cut
///
/// Texts at or under the limit are returned unchanged.
pub fn truncate_snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_end, _)) => format!("{}{}", &text[..byte_end], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Build a citation from one retrieved chunk
pub fn citation_from_chunk(chunk: &SourcedChunk) -> Citation {
    let meta = &chunk.metadata;
    Citation {
        page: meta.display_page(),
        url: meta.url.clone(),
        doc_id: meta.doc_id.clone(),
        score: meta.score,
        source: meta.source.clone(),
        snippet: truncate_snippet(&chunk.text, CITATION_SNIPPET_CHARS),
    }
}

/// Build the citation list for an answer, preserving retrieval order
pub fn build_citations(sources: &[SourcedChunk]) -> Vec<Citation> {
    sources.iter().map(citation_from_chunk).collect()
}

/// Diagnostic hit from an engine-retrieved chunk
pub fn hit_from_chunk(chunk: &SourcedChunk) -> RetrieveHit {
    RetrieveHit {
        text_len: chunk.text.chars().count(),
        page: chunk.metadata.display_page(),
        source: chunk.metadata.source.clone(),
        score: chunk.metadata.score,
        snippet: Some(truncate_snippet(&chunk.text, CITATION_SNIPPET_CHARS)),
    }
}

/// Diagnostic hit from a raw store row; the store distance becomes the score
pub fn hit_from_store_row(row: &StoreRow) -> RetrieveHit {
    let meta = row.metadata_or_default();
    RetrieveHit {
        text_len: row.text_len(),
        page: meta.display_page(),
        source: meta.source,
        score: row.distance.map(f64::from),
        snippet: row
            .document
            .as_deref()
            .map(|d| truncate_snippet(d, CITATION_SNIPPET_CHARS)),
    }
}

/// Peek row from a raw store row
pub fn peek_row(i: usize, row: &StoreRow) -> PeekRow {
    let meta = row.metadata_or_default();
    PeekRow {
        i,
        text_len: row.text_len(),
        page: meta.display_page(),
        source: meta.source,
        snippet: row
            .document
            .as_deref()
            .map(|d| truncate_snippet(d, PEEK_SNIPPET_CHARS)),
    }
}
