//! Configuration for the PDF Q&A service
//!
//! Resolved once at startup through an ordered chain: an explicit TOML file,
//! then environment-only configuration, then built-in defaults. Environment
//! overrides are applied last in every case.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "PDF_QA_CONFIG";
/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "pdf-qa.toml";

const ENV_STORE_DIR: &str = "STORE_DIR";
const ENV_COLL_NAME: &str = "COLL_NAME";
const ENV_HOST: &str = "PDF_QA_HOST";
const ENV_PORT: &str = "PDF_QA_PORT";
const ENV_OLLAMA_URL: &str = "OLLAMA_BASE_URL";
const ENV_CORS_ORIGIN: &str = "PDF_QA_CORS_ORIGIN";
const ENV_BACKEND: &str = "PDF_QA_BACKEND";

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Embedding/generation backend
    pub backend: BackendProvider,
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Ollama/LLM configuration
    pub llm: LlmConfig,
    /// Vector store configuration
    pub vector_db: VectorDbConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
}

/// Backend used for embeddings and generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    /// Local Ollama server
    #[default]
    Ollama,
    /// In-process hashing embedder and extractive answerer, no model server
    Offline,
}

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from a TOML file
    File(PathBuf),
    /// Defaults with at least one environment override
    Environment,
    /// Built-in defaults only
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "file {}", path.display()),
            ConfigSource::Environment => write!(f, "environment"),
            ConfigSource::Defaults => write!(f, "defaults"),
        }
    }
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
            .map_err(|e| Error::Config(format!("Invalid config {}: {}", path.display(), e)))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Resolve configuration from the process environment
    pub fn resolve() -> Result<(Self, ConfigSource)> {
        Self::resolve_with(|key| std::env::var(key).ok(), Path::new("."))
    }

    /// Resolve configuration with an injected environment lookup
    pub fn resolve_with<F>(lookup: F, working_dir: &Path) -> Result<(Self, ConfigSource)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (mut config, mut source) = if let Some(explicit) = lookup(CONFIG_PATH_ENV) {
            let path = PathBuf::from(explicit);
            (Self::from_file(&path)?, ConfigSource::File(path))
        } else {
            let local = working_dir.join(DEFAULT_CONFIG_FILE);
            if local.is_file() {
                (Self::from_file(&local)?, ConfigSource::File(local))
            } else {
                (Self::default(), ConfigSource::Defaults)
            }
        };

        let overridden = config.apply_env(&lookup)?;
        if overridden && source == ConfigSource::Defaults {
            source = ConfigSource::Environment;
        }

        config.validate()?;
        Ok((config, source))
    }

    /// Apply environment overrides, returning whether any were present
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<bool>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = false;

        if let Some(dir) = lookup(ENV_STORE_DIR) {
            self.vector_db.storage_dir = PathBuf::from(dir);
            applied = true;
        }
        if let Some(name) = lookup(ENV_COLL_NAME) {
            self.vector_db.collection_name = name;
            applied = true;
        }
        if let Some(host) = lookup(ENV_HOST) {
            self.server.host = host;
            applied = true;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port
                .parse()
                .map_err(|e| Error::Config(format!("Invalid {}: {}", ENV_PORT, e)))?;
            applied = true;
        }
        if let Some(url) = lookup(ENV_OLLAMA_URL) {
            self.llm.base_url = url;
            applied = true;
        }
        if let Some(origin) = lookup(ENV_CORS_ORIGIN) {
            self.server.cors_origin = origin;
            applied = true;
        }
        if let Some(backend) = lookup(ENV_BACKEND) {
            self.backend = match backend.to_lowercase().as_str() {
                "ollama" => BackendProvider::Ollama,
                "offline" => BackendProvider::Offline,
                other => {
                    return Err(Error::Config(format!("Unknown {}: {}", ENV_BACKEND, other)))
                }
            };
            applied = true;
        }

        Ok(applied)
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.vector_db.collection_name.trim().is_empty() {
            return Err(Error::Config("collection_name must not be empty".into()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be at least 1".into()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// The single origin allowed for cross-origin requests
    pub cors_origin: String,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
    /// Deadline for each engine/store call in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origin: "http://localhost:3000".to_string(),
            max_upload_size: 50 * 1024 * 1024, // 50MB
            request_timeout_secs: 120,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding dimensions (768 for nomic-embed-text)
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { dimensions: 768 }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in bytes
    pub chunk_size: usize,
    /// Overlap between chunks in bytes
    pub chunk_overlap: usize,
    /// Minimum chunk size (skip smaller chunks)
    pub min_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
            min_chunk_size: 1,
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            generate_model: "llama3.2:3b".to_string(),
            temperature: 0.0, // grounded answers, no sampling creativity
            timeout_secs: 120,
        }
    }
}

/// Vector store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Directory holding the collection files
    pub storage_dir: PathBuf,
    /// Collection name
    pub collection_name: String,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("vector_store"),
            collection_name: "pdf_rag_demo".to_string(),
        }
    }
}

impl VectorDbConfig {
    /// Path of the SQLite file backing the collection
    pub fn collection_path(&self) -> PathBuf {
        self.storage_dir
            .join(format!("{}.sqlite3", self.collection_name))
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks handed to answer synthesis
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}
