//! Provider abstractions for embeddings, LLM generation, and vector storage
//!
//! Trait seams keep the orchestration code independent of the concrete
//! external services and allow mock providers in tests.

pub mod embedding;
pub mod gemini;
pub mod http_embedder;
pub mod llm;
pub mod pinecone;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use gemini::GeminiClient;
pub use http_embedder::HttpEmbedder;
pub use llm::LlmProvider;
pub use pinecone::PineconeIndex;
pub use vector_store::{VectorSearchResult, VectorStoreProvider};
