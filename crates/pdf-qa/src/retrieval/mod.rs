//! Retrieval engine, diagnostic retrieval, and collection inspection

pub mod diagnostic;
pub mod engine;
pub mod inspect;
pub mod local;

pub use diagnostic::DiagnosticRetriever;
pub use engine::{EngineAnswer, EngineCapabilities, IngestSummary, QueryOptions, RetrievalEngine};
pub use inspect::{CollectionInspector, PeekShape};
pub use local::LocalRagEngine;
