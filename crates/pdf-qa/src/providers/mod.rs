//! Provider abstractions for embeddings, generation, and vector storage
//!
//! The retrieval engine and the diagnostic paths only see these traits, so the
//! Ollama/SQLite backends can be swapped for in-process ones in tests.

pub mod embedding;
pub mod llm;
pub mod offline;
pub mod ollama;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use offline::{ExtractiveLlm, HashEmbedder};
pub use ollama::{OllamaEmbedder, OllamaLlm};
pub use vector_store::{PeekRequest, StoreCapabilities, VectorStoreProvider};
