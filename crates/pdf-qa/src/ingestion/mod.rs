//! PDF ingestion: upload staging, page extraction, and chunking

mod chunker;
mod parser;
mod upload;

pub use chunker::TextChunker;
pub use parser::{hash_bytes, PageText, ParsedPdf, PdfParser};
pub use upload::{ensure_pdf, ingested_message, UploadIngestor, NOT_A_PDF};

#[cfg(test)]
pub(crate) use parser::tests::pdf_with_pages;
