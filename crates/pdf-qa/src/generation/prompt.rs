//! Grounding instruction and prompt templates

use crate::types::SourcedChunk;

/// Fixed answer returned whenever the documents do not support an answer
pub const SENTINEL_ANSWER: &str = "I don't know based on the provided PDF.";

/// Grounding instruction sent as the system prompt with every question
pub const STRICT_SYSTEM_PROMPT: &str = "You answer ONLY using the provided context snippets.\n\
If the answer is not fully supported by the context, reply exactly: \"I don't know based on the provided PDF.\"\n\
Never use outside knowledge. Quote short relevant lines when possible.\n\
Return concise answers.";

/// Header that opens the context block of a question prompt
pub const CONTEXT_HEADER: &str = "Context:";
/// Prefix of the question line of a question prompt
pub const QUESTION_PREFIX: &str = "Question:";
/// Separator between context entries
pub const ENTRY_SEPARATOR: &str = "---";

/// Prompt builder for grounded questions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the numbered context block from retrieved chunks
    pub fn build_context(sources: &[SourcedChunk]) -> String {
        let mut context = String::new();

        for (i, chunk) in sources.iter().enumerate() {
            context.push_str(&format!(
                "[{}] {}\n{}\n\n{}\n\n",
                i + 1,
                Self::format_source_ref(chunk),
                chunk.text.trim(),
                ENTRY_SEPARATOR
            ));
        }

        context
    }

    /// Format the source reference line for one chunk
    fn format_source_ref(chunk: &SourcedChunk) -> String {
        let mut parts = vec![chunk
            .metadata
            .source
            .clone()
            .unwrap_or_else(|| "unknown source".to_string())];

        if let Some(page) = chunk.metadata.display_page() {
            match page {
                crate::types::PageRef::Index(n) => parts.push(format!("page {}", n)),
                crate::types::PageRef::Other(value) => parts.push(format!("page {}", value)),
            }
        }

        parts.join(", ")
    }

    /// Build the user prompt: context block followed by the question
    pub fn build_question_prompt(question: &str, context: &str) -> String {
        format!(
            "{header}\n{context}\n{prefix} {question}\nAnswer:",
            header = CONTEXT_HEADER,
            context = context,
            prefix = QUESTION_PREFIX,
            question = question
        )
    }
}
