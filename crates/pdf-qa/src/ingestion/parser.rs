//! PDF text extraction with page tracking

use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Extracted text of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// Page index (0-indexed)
    pub index: u32,
    /// Cleaned text content of the page
    pub text: String,
}

/// Parsed PDF with per-page text
#[derive(Debug, Clone)]
pub struct ParsedPdf {
    /// Pages that yielded text, in document order
    pub pages: Vec<PageText>,
    /// Total pages in the document
    pub total_pages: u32,
    /// SHA-256 of the raw file bytes, hex encoded
    pub content_hash: String,
}

impl ParsedPdf {
    /// Whether no page produced any text
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// PDF parser
pub struct PdfParser;

impl PdfParser {
    /// Parse a PDF from memory
    ///
    /// Text is read page by page with lopdf. When that yields nothing (or the
    /// document structure can't be loaded) the whole document is extracted with
    /// pdf-extract and attributed to the first page.
    pub fn parse(filename: &str, data: &[u8]) -> Result<ParsedPdf> {
        let content_hash = hash_bytes(data);

        let (pages, total_pages) = match lopdf::Document::load_mem(data) {
            Ok(doc) => {
                let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
                let total = page_numbers.len() as u32;
                let mut pages = Vec::new();

                for (index, number) in page_numbers.into_iter().enumerate() {
                    match doc.extract_text(&[number]) {
                        Ok(raw) => {
                            let text = clean_text(&raw);
                            if !text.is_empty() {
                                pages.push(PageText {
                                    index: index as u32,
                                    text,
                                });
                            }
                        }
                        Err(e) => {
                            tracing::debug!("{}: no text on page {}: {}", filename, number, e);
                        }
                    }
                }
                (pages, total)
            }
            Err(e) => {
                tracing::debug!("{}: lopdf could not load document: {}", filename, e);
                (Vec::new(), 0)
            }
        };

        if !pages.is_empty() {
            return Ok(ParsedPdf {
                pages,
                total_pages,
                content_hash,
            });
        }

        let raw = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;
        let text = clean_text(&raw);

        let pages = if text.is_empty() {
            Vec::new()
        } else {
            vec![PageText { index: 0, text }]
        };

        Ok(ParsedPdf {
            pages,
            total_pages: total_pages.max(1),
            content_hash,
        })
    }
}

/// Rejoin words hyphenated across line breaks, then collapse whitespace runs
fn clean_text(raw: &str) -> String {
    static HYPHENATED: OnceLock<Regex> = OnceLock::new();
    let hyphenated = HYPHENATED.get_or_init(|| {
        Regex::new(r"(\w)-[ \t]*\r?\n\s*(\w)").expect("hyphenation pattern is valid")
    });

    let joined = hyphenated.replace_all(raw, "$1$2");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Hex-encoded SHA-256 of raw bytes
pub fn hash_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
