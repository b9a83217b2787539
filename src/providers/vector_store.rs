//! Vector store provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Chunk;

/// Search result from the vector index
#[derive(Debug, Clone)]
pub struct VectorSearchResult {
    /// The matched chunk
    pub chunk: Chunk,
    /// Similarity score (0.0 to 1.0, higher is more similar)
    pub score: f32,
}

/// Trait for namespaced vector storage and similarity search
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Upsert embedded chunks into the active namespace
    async fn upsert(&self, chunks: &[Chunk]) -> Result<usize>;

    /// Search the active namespace for the nearest chunks
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<VectorSearchResult>>;

    /// Delete every vector in the active namespace
    async fn delete_all(&self) -> Result<()>;

    /// Number of vectors stored in the active namespace
    async fn count(&self) -> Result<usize>;

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
