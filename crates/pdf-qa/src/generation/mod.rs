//! Answer synthesis, citations, prompts, and the Ollama client

pub mod answer;
pub mod citation;
pub mod ollama;
pub mod prompt;

pub use answer::AnswerSynthesizer;
pub use ollama::OllamaClient;
pub use prompt::{PromptBuilder, SENTINEL_ANSWER, STRICT_SYSTEM_PROMPT};
