//! LLM provider trait for answer generation

use async_trait::async_trait;
use crate::error::Result;

/// Trait for LLM-based answer generation
///
/// Implementations:
/// - `OllamaLlm`: Local Ollama server
/// - `ExtractiveLlm`: Returns the best-matching context line verbatim
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for `prompt` under the given system instruction
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
