//! Top-K retrieval for a natural-language question

use std::sync::Arc;

use crate::error::Result;
use crate::providers::{EmbeddingProvider, VectorSearchResult, VectorStoreProvider};

/// Number of chunks retrieved per question
pub const DEFAULT_TOP_K: usize = 10;

/// Embeds a question and fetches the nearest chunks from the index
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever with the default top-K
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Self {
        Self {
            embedder,
            store,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Override the number of retrieved chunks
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Retrieve the nearest chunks for a question, best-first
    pub async fn retrieve(&self, question: &str) -> Result<Vec<VectorSearchResult>> {
        let query_embedding = self.embedder.embed(question).await?;
        let mut results = self.store.query(&query_embedding, self.top_k).await?;

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        if !results.is_empty() {
            let mean: f32 =
                results.iter().map(|r| r.score).sum::<f32>() / results.len() as f32;
            tracing::info!(
                "Retrieved {} chunks (mean relevance: {:.3})",
                results.len(),
                mean
            );
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{Chunk, FileType};
    use async_trait::async_trait;
    use uuid::Uuid;

    struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            3
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct UnorderedStore;

    #[async_trait]
    impl VectorStoreProvider for UnorderedStore {
        async fn upsert(&self, _chunks: &[Chunk]) -> Result<usize> {
            Ok(0)
        }

        async fn query(&self, _embedding: &[f32], top_k: usize) -> Result<Vec<VectorSearchResult>> {
            let doc_id = Uuid::new_v4();
            let make = |content: &str, score: f32| VectorSearchResult {
                chunk: Chunk::new(
                    doc_id,
                    content.to_string(),
                    "paper.pdf".to_string(),
                    FileType::Pdf,
                    0,
                ),
                score,
            };
            Ok(vec![make("middle", 0.5), make("best", 0.9), make("worst", 0.1)]
                .into_iter()
                .take(top_k)
                .collect())
        }

        async fn delete_all(&self) -> Result<()> {
            Ok(())
        }

        async fn count(&self) -> Result<usize> {
            Ok(3)
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "unordered"
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::embedding("unavailable"))
        }

        fn dimensions(&self) -> usize {
            3
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(false)
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_results_ordered_best_first() {
        let retriever = Retriever::new(Arc::new(FixedEmbedder), Arc::new(UnorderedStore));
        let results = retriever.retrieve("what is attention?").await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].chunk.content, "best");
        assert_eq!(results[2].chunk.content, "worst");
    }

    #[tokio::test]
    async fn test_embed_failure_propagates() {
        let retriever = Retriever::new(Arc::new(FailingEmbedder), Arc::new(UnorderedStore));
        assert!(retriever.retrieve("anything").await.is_err());
    }
}
