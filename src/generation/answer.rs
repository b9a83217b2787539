//! Answer pipeline: retrieval, generation with retry, excerpt fallback

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, LlmProvider, VectorSearchResult, VectorStoreProvider};
use crate::retrieval::Retriever;
use crate::types::{AnswerLength, AnswerResponse, AnswerStyle};

use super::fallback::{format_excerpt_answer, NO_RELEVANT_INFORMATION};
use super::prompt::PromptBuilder;

/// Classify an LLM failure as a rate limit
///
/// Matches HTTP 429 plus the quota/rate phrasing the provider uses in error
/// bodies.
pub fn is_rate_limit(error: &Error) -> bool {
    let message = error.to_string().to_lowercase();
    message.contains("429") || message.contains("quota") || message.contains("rate")
}

/// End-to-end question answering over the active document
pub struct AnswerPipeline {
    retriever: Retriever,
    llm: Arc<dyn LlmProvider>,
    max_retries: u32,
    retry_delay: Duration,
}

impl AnswerPipeline {
    /// Create a pipeline from providers and the LLM retry configuration
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        llm: Arc<dyn LlmProvider>,
        config: &LlmConfig,
    ) -> Self {
        Self {
            retriever: Retriever::new(embedder, store),
            llm,
            max_retries: config.max_retries.max(1),
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        }
    }

    /// Answer a question about the active document
    ///
    /// Retrieval always runs first. Generation is attempted up to
    /// `max_retries` times, waiting `retry_delay × attempt` between
    /// rate-limited attempts; any other failure stops retrying immediately.
    /// When generation never succeeds the curated excerpt fallback is
    /// returned instead.
    pub async fn answer(
        &self,
        question: &str,
        style: AnswerStyle,
        length: AnswerLength,
    ) -> Result<AnswerResponse> {
        let start = Instant::now();

        tracing::info!("Question: \"{}\"", question);

        let results = self.retriever.retrieve(question).await?;

        if results.is_empty() {
            return Ok(AnswerResponse {
                answer: NO_RELEVANT_INFORMATION.to_string(),
                generated: false,
                chunks_retrieved: 0,
                mean_relevance: 0.0,
                processing_time_ms: start.elapsed().as_millis() as u64,
            });
        }

        let mean_relevance =
            results.iter().map(|r| r.score).sum::<f32>() / results.len() as f32;

        match self.generate_with_retry(question, &results, style, length).await {
            Some(answer) => {
                let elapsed = start.elapsed();
                let footer = format!(
                    "\n\n---\nGenerated from {} relevant sections (relevance: {:.0}%) in {:.1}s",
                    results.len(),
                    mean_relevance * 100.0,
                    elapsed.as_secs_f64()
                );

                Ok(AnswerResponse {
                    answer: answer + &footer,
                    generated: true,
                    chunks_retrieved: results.len(),
                    mean_relevance,
                    processing_time_ms: elapsed.as_millis() as u64,
                })
            }
            None => {
                tracing::info!("Falling back to curated excerpts");
                let answer = format_excerpt_answer(&results, question, length);

                Ok(AnswerResponse {
                    answer,
                    generated: false,
                    chunks_retrieved: results.len(),
                    mean_relevance,
                    processing_time_ms: start.elapsed().as_millis() as u64,
                })
            }
        }
    }

    /// Attempt generation with linear backoff on rate limits
    async fn generate_with_retry(
        &self,
        question: &str,
        results: &[VectorSearchResult],
        style: AnswerStyle,
        length: AnswerLength,
    ) -> Option<String> {
        let prompt = PromptBuilder::build_answer_prompt(question, results, style, length);

        for attempt in 1..=self.max_retries {
            tracing::info!(
                "Generating answer (attempt {}/{})",
                attempt,
                self.max_retries
            );

            match self.llm.generate(&prompt).await {
                Ok(answer) => return Some(answer),
                Err(e) if is_rate_limit(&e) => {
                    if attempt < self.max_retries {
                        let wait = self.retry_delay * attempt;
                        tracing::warn!("Rate limited, waiting {:?} before retry", wait);
                        sleep(wait).await;
                    } else {
                        tracing::warn!("Rate limit persists after {} attempts", attempt);
                    }
                }
                Err(e) => {
                    tracing::error!("Generation failed: {}", e);
                    return None;
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, FileType};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            2
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct StaticStore {
        contents: Vec<(&'static str, f32)>,
    }

    #[async_trait]
    impl VectorStoreProvider for StaticStore {
        async fn upsert(&self, _chunks: &[Chunk]) -> Result<usize> {
            Ok(0)
        }

        async fn query(&self, _embedding: &[f32], _top_k: usize) -> Result<Vec<VectorSearchResult>> {
            let doc_id = Uuid::new_v4();
            Ok(self
                .contents
                .iter()
                .map(|(content, score)| VectorSearchResult {
                    chunk: Chunk::new(
                        doc_id,
                        content.to_string(),
                        "paper.pdf".to_string(),
                        FileType::Pdf,
                        0,
                    ),
                    score: *score,
                })
                .collect())
        }

        async fn delete_all(&self) -> Result<()> {
            Ok(())
        }

        async fn count(&self) -> Result<usize> {
            Ok(self.contents.len())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    enum LlmBehavior {
        Succeed,
        RateLimit,
        Fail,
    }

    struct CountingLlm {
        behavior: LlmBehavior,
        calls: AtomicUsize,
    }

    impl CountingLlm {
        fn new(behavior: LlmBehavior) -> Self {
            Self {
                behavior,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for CountingLlm {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                LlmBehavior::Succeed => Ok("The encoder has six layers.".to_string()),
                LlmBehavior::RateLimit => Err(Error::llm(
                    "Gemini generation failed (429 Too Many Requests): quota exceeded",
                )),
                LlmBehavior::Fail => Err(Error::llm("Gemini generation failed (500): boom")),
            }
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "counting"
        }

        fn model(&self) -> &str {
            "test-model"
        }
    }

    fn fast_config() -> LlmConfig {
        LlmConfig {
            max_retries: 3,
            retry_delay_secs: 0,
            ..LlmConfig::default()
        }
    }

    fn pipeline(store: StaticStore, llm: Arc<CountingLlm>) -> AnswerPipeline {
        AnswerPipeline::new(
            Arc::new(FixedEmbedder),
            Arc::new(store),
            llm,
            &fast_config(),
        )
    }

    #[test]
    fn test_rate_limit_classification() {
        assert!(is_rate_limit(&Error::llm("HTTP 429 from upstream")));
        assert!(is_rate_limit(&Error::llm("Quota exceeded for model")));
        assert!(is_rate_limit(&Error::llm("rate limit hit")));
        assert!(!is_rate_limit(&Error::llm("connection refused")));
    }

    #[tokio::test]
    async fn test_no_results_skips_generator() {
        let llm = Arc::new(CountingLlm::new(LlmBehavior::Succeed));
        let pipeline = pipeline(StaticStore { contents: vec![] }, llm.clone());

        let response = pipeline
            .answer("unknown topic?", AnswerStyle::Balanced, AnswerLength::Medium)
            .await
            .unwrap();

        assert_eq!(response.answer, NO_RELEVANT_INFORMATION);
        assert!(!response.generated);
        assert_eq!(response.chunks_retrieved, 0);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_successful_generation() {
        let llm = Arc::new(CountingLlm::new(LlmBehavior::Succeed));
        let pipeline = pipeline(
            StaticStore {
                contents: vec![("the encoder stacks six layers", 0.8)],
            },
            llm.clone(),
        );

        let response = pipeline
            .answer("how many layers?", AnswerStyle::Balanced, AnswerLength::Medium)
            .await
            .unwrap();

        assert!(response.generated);
        assert!(response.answer.starts_with("The encoder has six layers."));
        assert!(response.answer.contains("Generated from 1 relevant sections"));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_retries_then_falls_back() {
        let llm = Arc::new(CountingLlm::new(LlmBehavior::RateLimit));
        let pipeline = pipeline(
            StaticStore {
                contents: vec![("multi-head attention runs heads in parallel", 0.9)],
            },
            llm.clone(),
        );

        let response = pipeline
            .answer("what is attention?", AnswerStyle::Balanced, AnswerLength::Medium)
            .await
            .unwrap();

        // Exactly 3 attempts, then the excerpt fallback with the top chunk
        assert_eq!(llm.calls.load(Ordering::SeqCst), 3);
        assert!(!response.generated);
        assert!(response
            .answer
            .contains("multi-head attention runs heads in parallel"));
        assert!(response.answer.contains("temporarily unavailable"));
    }

    #[tokio::test]
    async fn test_non_rate_limit_error_fails_fast() {
        let llm = Arc::new(CountingLlm::new(LlmBehavior::Fail));
        let pipeline = pipeline(
            StaticStore {
                contents: vec![("some relevant content", 0.7)],
            },
            llm.clone(),
        );

        let response = pipeline
            .answer("a question?", AnswerStyle::Balanced, AnswerLength::Medium)
            .await
            .unwrap();

        // One attempt only, straight to fallback
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
        assert!(!response.generated);
        assert!(response.answer.contains("some relevant content"));
    }
}
