//! Upload ingestion: validate, stage to a temp file, hand to the engine

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{with_deadline, Error, Result};
use crate::retrieval::{IngestSummary, RetrievalEngine};
use crate::types::{ChunkMetadata, DataType};

/// Rejection message for non-PDF uploads
pub const NOT_A_PDF: &str = "Please upload a .pdf";

/// Reject any filename that doesn't end in `.pdf` (case-insensitive)
pub fn ensure_pdf(filename: &str) -> Result<()> {
    if filename.to_lowercase().ends_with(".pdf") {
        Ok(())
    } else {
        Err(Error::UnsupportedFileType(NOT_A_PDF.to_string()))
    }
}

/// Ingests uploaded PDFs into the retrieval engine
pub struct UploadIngestor {
    engine: Arc<dyn RetrievalEngine>,
    timeout: Duration,
}

impl UploadIngestor {
    /// Create an ingestor
    pub fn new(engine: Arc<dyn RetrievalEngine>, timeout: Duration) -> Self {
        Self { engine, timeout }
    }

    /// Ingest one uploaded file
    ///
    /// The bytes are staged in a temporary `.pdf` file that is removed when
    /// this returns, whether ingestion succeeded or not.
    pub async fn ingest(&self, filename: &str, data: &[u8]) -> Result<IngestSummary> {
        ensure_pdf(filename)?;

        let start = Instant::now();
        let staged = tempfile::Builder::new()
            .prefix("pdf-qa-")
            .suffix(".pdf")
            .tempfile()?;
        tokio::fs::write(staged.path(), data).await?;

        let metadata = ChunkMetadata::with_source(filename);
        let summary = with_deadline(
            self.timeout,
            self.engine.add(staged.path(), DataType::PdfFile, metadata),
        )
        .await?;

        tracing::info!(
            "Ingested {} ({} pages, {} chunks) in {}ms",
            filename,
            summary.pages,
            summary.chunks,
            start.elapsed().as_millis()
        );

        Ok(summary)
    }
}

/// Client-facing confirmation for a successful upload
pub fn ingested_message(filename: &str) -> String {
    format!("Ingested {}", filename)
}
