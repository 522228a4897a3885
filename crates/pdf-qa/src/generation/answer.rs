//! Grounded answer synthesis
//!
//! An answer reaches the client only when at least one retrieved chunk backs
//! it. Whatever the engine says, an empty citation list yields the sentinel.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{with_deadline, Error, Result};
use crate::retrieval::{EngineAnswer, QueryOptions, RetrievalEngine};
use crate::types::Answer;

use super::citation::build_citations;
use super::prompt::{SENTINEL_ANSWER, STRICT_SYSTEM_PROMPT};

/// Answers questions strictly from retrieved document content
pub struct AnswerSynthesizer {
    engine: Arc<dyn RetrievalEngine>,
    system_prompt: String,
    timeout: Duration,
}

impl AnswerSynthesizer {
    /// Create a synthesizer using the strict grounding instruction
    pub fn new(engine: Arc<dyn RetrievalEngine>, timeout: Duration) -> Self {
        Self {
            engine,
            system_prompt: STRICT_SYSTEM_PROMPT.to_string(),
            timeout,
        }
    }

    /// Answer one question
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::validation("Empty question"));
        }

        let start = Instant::now();
        let options = QueryOptions {
            citations: true,
            system_prompt: self.system_prompt.clone(),
        };

        let result = with_deadline(self.timeout, self.engine.query(question, &options)).await?;
        let answer = ground(result);

        tracing::info!(
            "Answered in {}ms with {} citations",
            start.elapsed().as_millis(),
            answer.citations.len()
        );

        Ok(answer)
    }
}

/// Turn an engine result into a client answer, enforcing the citation rule
pub fn ground(result: EngineAnswer) -> Answer {
    let citations = build_citations(&result.sources);

    let text = if citations.is_empty() {
        if result.answer.trim() != SENTINEL_ANSWER {
            tracing::debug!("Engine answered without supporting chunks; replacing with sentinel");
        }
        SENTINEL_ANSWER.to_string()
    } else {
        result.answer
    };

    Answer { text, citations }
}
