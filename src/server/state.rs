//! Application state for the question-answering server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::generation::AnswerPipeline;
use crate::ingestion::IngestPipeline;
use crate::providers::{
    EmbeddingProvider, GeminiClient, HttpEmbedder, LlmProvider, PineconeIndex,
    VectorStoreProvider,
};
use crate::types::response::ModelStatus;
use crate::types::CurrentDocument;

use super::limiter::RateLimiter;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: Config,
    /// Embedding provider, constructed once so the remote model stays warm
    embedder: Arc<dyn EmbeddingProvider>,
    /// LLM provider
    llm: Arc<dyn LlmProvider>,
    /// Vector index provider
    store: Arc<dyn VectorStoreProvider>,
    /// The single active document record
    current: RwLock<CurrentDocument>,
    /// Embedding model warmup status
    model_status: RwLock<ModelStatus>,
    /// Per-IP rate limiter
    limiter: RateLimiter,
}

impl AppState {
    /// Create application state with the production providers
    pub fn new(config: Config) -> Result<Self> {
        let dimension = config.index_dimension();

        let embedder: Arc<dyn EmbeddingProvider> =
            Arc::new(HttpEmbedder::new(&config.embedding)?);
        let llm: Arc<dyn LlmProvider> = Arc::new(GeminiClient::new(&config.llm)?);
        let store: Arc<dyn VectorStoreProvider> =
            Arc::new(PineconeIndex::new(&config.index, dimension)?);

        tracing::info!(
            "Providers initialized (embedding: {} @ {} dims, llm: {}, index: {})",
            config.embedding.profile.model_name(),
            dimension,
            llm.model(),
            store.name()
        );

        Ok(Self::with_providers(config, embedder, llm, store))
    }

    /// Create application state with injected providers
    pub fn with_providers(
        config: Config,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Self {
        let limiter = RateLimiter::new(&config.rate_limit);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                embedder,
                llm,
                store,
                current: RwLock::new(CurrentDocument::default()),
                model_status: RwLock::new(ModelStatus::default()),
                limiter,
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the embedding provider
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    /// Get the LLM provider
    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm
    }

    /// Get the vector store provider
    pub fn store(&self) -> &Arc<dyn VectorStoreProvider> {
        &self.inner.store
    }

    /// Get the rate limiter
    pub fn limiter(&self) -> &RateLimiter {
        &self.inner.limiter
    }

    /// Snapshot of the current-document record
    pub fn current_document(&self) -> CurrentDocument {
        self.inner.current.read().clone()
    }

    /// Mutate the current-document record
    pub fn update_document<F: FnOnce(&mut CurrentDocument)>(&self, f: F) {
        f(&mut self.inner.current.write());
    }

    /// Embedding model warmup status
    pub fn model_status(&self) -> ModelStatus {
        self.inner.model_status.read().clone()
    }

    /// Update the warmup status
    pub fn set_model_status(&self, ready: bool, message: impl Into<String>) {
        let mut status = self.inner.model_status.write();
        status.ready = ready;
        status.message = message.into();
    }

    /// Build an ingestion pipeline over the shared providers
    pub fn ingest_pipeline(&self) -> IngestPipeline {
        IngestPipeline::new(
            self.inner.config.chunking.clone(),
            self.inner.config.embedding.batch_size,
            Arc::clone(&self.inner.embedder),
            Arc::clone(&self.inner.store),
        )
    }

    /// Build an answer pipeline over the shared providers
    pub fn answer_pipeline(&self) -> AnswerPipeline {
        AnswerPipeline::new(
            Arc::clone(&self.inner.embedder),
            Arc::clone(&self.inner.store),
            Arc::clone(&self.inner.llm),
            &self.inner.config.llm,
        )
    }

    /// Warm up the embedding provider and record the outcome
    pub async fn warm_up(&self) {
        tracing::info!("Warming up embedding model...");
        match self.inner.embedder.embed("warmup").await {
            Ok(_) => {
                self.set_model_status(true, "Ready");
                tracing::info!("Embedding model ready");
            }
            Err(e) => {
                self.set_model_status(false, format!("Error: {}", e));
                tracing::warn!("Embedding warmup failed: {}", e);
            }
        }
    }
}
