//! pdf-qa: Grounded question answering over uploaded PDF documents
//!
//! Uploaded PDFs are split into page-tagged chunks, embedded, and stored in a
//! local vector collection. Questions are answered only from retrieved chunks,
//! with one-based page citations; when nothing supports an answer the service
//! replies with a fixed "I don't know" sentinel instead.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use types::{
    document::{ChunkMetadata, PageRef, SourcedChunk},
    response::{AskResponse, Citation},
};
