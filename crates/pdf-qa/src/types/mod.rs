//! Core types for the PDF Q&A service

pub mod document;
pub mod response;

pub use document::{ChunkMetadata, DataType, PageRef, SourcedChunk, StoreRecord, StoreRow};
pub use response::{
    Answer, AskRequest, AskResponse, Citation, PeekResponse, PeekRow, RetrieveHit,
    RetrieveResponse, UploadResponse,
};
