//! Ingestion pipeline orchestration

use std::sync::Arc;
use std::time::Instant;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, VectorStoreProvider};
use crate::types::{Document, IngestReport};

use super::batch::embed_in_batches;
use super::converter::FileConverter;
use super::splitter::ChunkSplitter;

/// Minimum fraction of chunks that must embed successfully
const MIN_EMBEDDED_FRACTION: f64 = 0.5;

/// Full ingestion pipeline: convert, chunk, embed, upsert
pub struct IngestPipeline {
    chunking: ChunkingConfig,
    batch_size: usize,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
}

impl IngestPipeline {
    /// Create a new pipeline
    pub fn new(
        chunking: ChunkingConfig,
        batch_size: usize,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Self {
        Self {
            chunking,
            batch_size,
            embedder,
            store,
        }
    }

    /// Ingest one document, replacing whatever the namespace held before
    pub async fn ingest(&self, filename: &str, data: &[u8]) -> Result<IngestReport> {
        let start = Instant::now();

        if data.is_empty() {
            return Err(Error::EmptyUpload);
        }

        tracing::info!("Ingesting '{}' ({} bytes)", filename, data.len());

        // Clear the prior document's vectors so papers never mix in the namespace
        if let Err(e) = self.store.delete_all().await {
            tracing::warn!("Failed to clear namespace before ingest: {}", e);
        }

        let parsed = FileConverter::convert(filename, data)?;
        tracing::info!(
            "Extracted {} chars from '{}' ({})",
            parsed.content.chars().count(),
            filename,
            parsed.file_type.display_name()
        );

        // Large files trade overlap granularity for throughput
        let (split_length, batch_size) = if data.len() as u64 >= self.chunking.large_file_threshold
        {
            tracing::info!(
                "Large file detected, using split_length={} batch_size={}",
                self.chunking.large_file_split_length,
                self.chunking.large_file_batch_size
            );
            (
                self.chunking.large_file_split_length,
                self.chunking.large_file_batch_size,
            )
        } else {
            (self.chunking.split_length, self.batch_size)
        };

        let doc = Document::new(
            filename.to_string(),
            parsed.file_type,
            parsed.content_hash.clone(),
            data.len() as u64,
        );

        let splitter = ChunkSplitter::new(
            split_length,
            self.chunking.split_overlap,
            self.chunking.max_chunk_chars,
        );
        let chunks = splitter.split(&doc, &parsed.content);

        if chunks.is_empty() {
            return Err(Error::file_parse(filename, "Splitter produced no chunks"));
        }

        let total_chunks = chunks.len();
        tracing::info!("Created {} chunks", total_chunks);

        let embedded = embed_in_batches(chunks, self.embedder.as_ref(), batch_size).await?;

        if (embedded.len() as f64) < total_chunks as f64 * MIN_EMBEDDED_FRACTION {
            return Err(Error::embedding(format!(
                "Too few chunks embedded ({}/{})",
                embedded.len(),
                total_chunks
            )));
        }
        if embedded.len() != total_chunks {
            tracing::warn!(
                "{} chunks created but only {} embedded",
                total_chunks,
                embedded.len()
            );
        }

        let written = self.store.upsert(&embedded).await?;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Ingested '{}': {} chunks in {:.1}s",
            filename,
            written,
            elapsed_ms as f64 / 1000.0
        );

        Ok(IngestReport {
            filename: filename.to_string(),
            file_type: parsed.file_type,
            chunks_written: written,
            elapsed_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::VectorSearchResult;
    use crate::types::Chunk;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct FixedEmbedder {
        dims: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.1; self.dims])
        }

        fn dimensions(&self) -> usize {
            self.dims
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        upserted: Mutex<Vec<Chunk>>,
        cleared: AtomicUsize,
        fail_delete: AtomicBool,
    }

    #[async_trait]
    impl VectorStoreProvider for RecordingStore {
        async fn upsert(&self, chunks: &[Chunk]) -> Result<usize> {
            self.upserted.lock().extend_from_slice(chunks);
            Ok(chunks.len())
        }

        async fn query(&self, _embedding: &[f32], _top_k: usize) -> Result<Vec<VectorSearchResult>> {
            Ok(Vec::new())
        }

        async fn delete_all(&self) -> Result<()> {
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(Error::vector_db("simulated delete failure"));
            }
            self.cleared.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn count(&self) -> Result<usize> {
            Ok(self.upserted.lock().len())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn pipeline(store: Arc<RecordingStore>) -> IngestPipeline {
        IngestPipeline::new(
            ChunkingConfig {
                split_length: 10,
                split_overlap: 2,
                ..ChunkingConfig::default()
            },
            4,
            Arc::new(FixedEmbedder { dims: 8 }),
            store,
        )
    }

    #[tokio::test]
    async fn test_ingest_text_document() {
        let store = Arc::new(RecordingStore::default());
        let pipeline = pipeline(store.clone());

        let text = (0..100)
            .map(|i| format!("word{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let report = pipeline.ingest("notes.txt", text.as_bytes()).await.unwrap();

        assert!(report.chunks_written > 0);
        assert_eq!(report.chunks_written, store.upserted.lock().len());
        assert_eq!(store.cleared.load(Ordering::SeqCst), 1);

        // Every stored chunk carries its embedding
        for chunk in store.upserted.lock().iter() {
            assert_eq!(chunk.embedding.len(), 8);
            assert_eq!(chunk.filename, "notes.txt");
        }
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let store = Arc::new(RecordingStore::default());
        let pipeline = pipeline(store);
        let err = pipeline.ingest("notes.txt", b"").await.unwrap_err();
        assert!(matches!(err, Error::EmptyUpload));
    }

    #[tokio::test]
    async fn test_unsupported_type_rejected() {
        let store = Arc::new(RecordingStore::default());
        let pipeline = pipeline(store.clone());
        let err = pipeline.ingest("binary.exe", b"MZ").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedFileType(_)));
        assert!(store.upserted.lock().is_empty());
    }

    #[tokio::test]
    async fn test_namespace_clear_failure_tolerated() {
        let store = Arc::new(RecordingStore::default());
        store.fail_delete.store(true, Ordering::SeqCst);
        let pipeline = pipeline(store.clone());

        let report = pipeline
            .ingest("notes.txt", b"a handful of words to ingest cleanly")
            .await
            .unwrap();
        assert!(report.chunks_written > 0);
    }
}
