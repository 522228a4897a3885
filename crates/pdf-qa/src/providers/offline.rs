//! In-process providers that need no model server
//!
//! `HashEmbedder` maps words into a fixed number of hashed buckets, so texts
//! sharing vocabulary land close together. `ExtractiveLlm` answers by quoting
//! the context line with the most words in common with the question. Used by
//! the `offline` backend and throughout the tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::generation::prompt::{
    CONTEXT_HEADER, ENTRY_SEPARATOR, QUESTION_PREFIX, SENTINEL_ANSWER,
};

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

/// Deterministic bag-of-words embedder
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    /// Create an embedder producing `dimensions`-long vectors
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in tokens(text) {
            let bucket = (fnv1a(token.as_bytes()) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vectorize(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "hash"
    }
}

/// Answers by quoting the best-overlapping context line
#[derive(Debug, Default)]
pub struct ExtractiveLlm;

impl ExtractiveLlm {
    /// Create the extractive answerer
    pub fn new() -> Self {
        Self
    }

    fn answer(prompt: &str) -> String {
        let Some(question) = prompt
            .lines()
            .rev()
            .find_map(|line| line.strip_prefix(QUESTION_PREFIX))
        else {
            return SENTINEL_ANSWER.to_string();
        };

        let wanted: Vec<String> = tokens(question).filter(|t| t.len() >= 3).collect();

        let best = context_lines(prompt)
            .map(|line| {
                let overlap = tokens(line)
                    .filter(|t| wanted.contains(t))
                    .count();
                (overlap, line)
            })
            .filter(|(overlap, _)| *overlap > 0)
            // first line wins ties
            .fold(None::<(usize, &str)>, |best, candidate| match best {
                Some(current) if current.0 >= candidate.0 => Some(current),
                _ => Some(candidate),
            });

        match best {
            Some((_, line)) => line.trim().to_string(),
            None => SENTINEL_ANSWER.to_string(),
        }
    }
}

#[async_trait]
impl LlmProvider for ExtractiveLlm {
    async fn generate(&self, _system_prompt: &str, prompt: &str) -> Result<String> {
        Ok(Self::answer(prompt))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "extractive"
    }

    fn model(&self) -> &str {
        "extractive"
    }
}

/// Body lines of the context block, without reference headers or separators
fn context_lines(prompt: &str) -> impl Iterator<Item = &str> {
    prompt
        .lines()
        .skip_while(|line| *line != CONTEXT_HEADER)
        .skip(1)
        .take_while(|line| !line.starts_with(QUESTION_PREFIX))
        .filter(|line| {
            let line = line.trim();
            !line.is_empty() && line != ENTRY_SEPARATOR && !line.starts_with('[')
        })
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::prompt::PromptBuilder;
    use crate::types::{ChunkMetadata, SourcedChunk};

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_hash_embedder_is_deterministic_and_normalized() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed("Revenue grew in Q2").await.unwrap();
        let b = embedder.embed("revenue GREW in q2").await.unwrap();

        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
        assert!((cosine(&a, &a) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_shared_vocabulary_is_closer() {
        let embedder = HashEmbedder::default();
        let question = embedder.embed("What was the revenue growth?").await.unwrap();
        let related = embedder.embed("Revenue grew 20% and revenue growth held").await.unwrap();
        let unrelated = embedder.embed("The cafeteria menu lists soup").await.unwrap();

        assert!(cosine(&question, &related) > cosine(&question, &unrelated));
    }

    #[tokio::test]
    async fn test_empty_text_embeds_to_zero_vector() {
        let embedder = HashEmbedder::new(8);
        let v = embedder.embed("  ").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn test_extractive_quotes_matching_line() {
        let sources = vec![
            SourcedChunk::new("Headcount stayed flat.", ChunkMetadata::with_source("r.pdf")),
            SourcedChunk::new("Revenue grew 20% in Q2.", ChunkMetadata::with_source("r.pdf")),
        ];
        let context = PromptBuilder::build_context(&sources);
        let prompt = PromptBuilder::build_question_prompt("What was the revenue growth?", &context);

        let answer = ExtractiveLlm::new().generate("", &prompt).await.unwrap();
        assert_eq!(answer, "Revenue grew 20% in Q2.");
    }

    #[tokio::test]
    async fn test_extractive_without_overlap_is_sentinel() {
        let sources = vec![SourcedChunk::new("Soup of the day.", ChunkMetadata::default())];
        let context = PromptBuilder::build_context(&sources);
        let prompt = PromptBuilder::build_question_prompt("Who founded Rome?", &context);

        let answer = ExtractiveLlm::new().generate("", &prompt).await.unwrap();
        assert_eq!(answer, SENTINEL_ANSWER);
    }
}
