//! Batch embedding with bounded failure tolerance

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::Chunk;

/// Fraction of batches allowed to fail before the whole run aborts
const MAX_BATCH_FAILURE_RATE: f64 = 0.2;

/// Embed chunks in fixed-size batches, tolerating isolated batch failures
///
/// Batches embed sequentially. A failed batch is recorded and skipped; once
/// failures exceed 20% of the total batch count the run aborts. Returns the
/// successfully embedded chunks; zero successes is an error.
pub async fn embed_in_batches(
    chunks: Vec<Chunk>,
    provider: &dyn EmbeddingProvider,
    batch_size: usize,
) -> Result<Vec<Chunk>> {
    if chunks.is_empty() {
        tracing::warn!("No chunks to embed");
        return Ok(Vec::new());
    }

    let batch_size = batch_size.max(1);
    let total_batches = chunks.len().div_ceil(batch_size);
    tracing::info!(
        "Embedding {} chunks in {} batches (batch_size={})",
        chunks.len(),
        total_batches,
        batch_size
    );

    let mut embedded = Vec::with_capacity(chunks.len());
    let mut failed_batches: Vec<usize> = Vec::new();
    let mut remaining = chunks;
    let mut batch_num = 0usize;

    while !remaining.is_empty() {
        batch_num += 1;
        let take = batch_size.min(remaining.len());
        let batch: Vec<Chunk> = remaining.drain(..take).collect();
        let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();

        match provider.embed_batch(&texts).await {
            Ok(vectors) if vectors.len() == batch.len() => {
                for (mut chunk, vector) in batch.into_iter().zip(vectors) {
                    chunk.embedding = vector;
                    embedded.push(chunk);
                }
                tracing::debug!("Batch {}/{} complete", batch_num, total_batches);
            }
            Ok(vectors) => {
                tracing::error!(
                    "Batch {} returned {} embeddings for {} chunks",
                    batch_num,
                    vectors.len(),
                    batch.len()
                );
                failed_batches.push(batch_num);
            }
            Err(e) => {
                tracing::error!("Error in batch {}: {}", batch_num, e);
                failed_batches.push(batch_num);
            }
        }

        if failed_batches.len() as f64 > total_batches as f64 * MAX_BATCH_FAILURE_RATE {
            return Err(Error::PartialEmbedding {
                failed: failed_batches.len(),
                total: total_batches,
            });
        }
    }

    if !failed_batches.is_empty() {
        tracing::warn!(
            "{} of {} batches failed: {:?}",
            failed_batches.len(),
            total_batches,
            failed_batches
        );
    }

    if embedded.is_empty() {
        return Err(Error::embedding("No chunks were successfully embedded"));
    }

    Ok(embedded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileType;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    /// Embedder that fails specific batch calls (1-indexed)
    struct FlakyEmbedder {
        fail_calls: Vec<usize>,
        calls: AtomicUsize,
    }

    impl FlakyEmbedder {
        fn failing(fail_calls: Vec<usize>) -> Self {
            Self {
                fail_calls,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for FlakyEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.0; 4])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_calls.contains(&call) {
                return Err(Error::embedding(format!("simulated failure in call {}", call)));
            }
            Ok(texts.iter().map(|_| vec![0.0; 4]).collect())
        }

        fn dimensions(&self) -> usize {
            4
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn make_chunks(n: usize) -> Vec<Chunk> {
        let doc_id = Uuid::new_v4();
        (0..n)
            .map(|i| {
                Chunk::new(
                    doc_id,
                    format!("chunk {}", i),
                    "paper.pdf".to_string(),
                    FileType::Pdf,
                    i as u32,
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_all_batches_succeed() {
        let provider = FlakyEmbedder::failing(vec![]);
        let embedded = embed_in_batches(make_chunks(10), &provider, 2).await.unwrap();
        assert_eq!(embedded.len(), 10);
        for chunk in &embedded {
            assert_eq!(chunk.embedding.len(), 4);
        }
    }

    #[tokio::test]
    async fn test_isolated_failure_tolerated() {
        // 5 batches, 1 failure = exactly 20%, under the abort threshold
        let provider = FlakyEmbedder::failing(vec![3]);
        let embedded = embed_in_batches(make_chunks(10), &provider, 2).await.unwrap();
        assert_eq!(embedded.len(), 8);
    }

    #[tokio::test]
    async fn test_too_many_failures_abort() {
        // 5 batches, 2 failures = 40%, over the threshold
        let provider = FlakyEmbedder::failing(vec![2, 4]);
        let err = embed_in_batches(make_chunks(10), &provider, 2).await.unwrap_err();
        assert!(matches!(
            err,
            Error::PartialEmbedding { failed: 2, total: 5 }
        ));
        // Aborts at the second failure, not after all batches
        assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_zero_successes_is_error() {
        // A single batch failing is 100% > 20%
        let provider = FlakyEmbedder::failing(vec![1]);
        let err = embed_in_batches(make_chunks(2), &provider, 2).await.unwrap_err();
        assert!(matches!(err, Error::PartialEmbedding { .. }));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let provider = FlakyEmbedder::failing(vec![]);
        let embedded = embed_in_batches(Vec::new(), &provider, 2).await.unwrap();
        assert!(embedded.is_empty());
    }
}
