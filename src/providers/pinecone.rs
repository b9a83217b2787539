//! Pinecone index client
//!
//! Namespaced upsert, query, and delete-all against a managed vector index.
//! Chunk text and source metadata ride along with every vector so query
//! results can be mapped straight back into chunks.

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::types::Chunk;

use super::vector_store::{VectorSearchResult, VectorStoreProvider};

/// Client for a Pinecone-style managed vector index
pub struct PineconeIndex {
    client: Client,
    host: String,
    api_key: Option<String>,
    namespace: String,
    dimension: usize,
}

#[derive(serde::Serialize)]
struct UpsertRequest {
    vectors: Vec<VectorRecord>,
    namespace: String,
}

#[derive(serde::Serialize)]
struct VectorRecord {
    id: String,
    values: Vec<f32>,
    metadata: HashMap<String, serde_json::Value>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    upserted_count: usize,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    vector: Vec<f32>,
    top_k: usize,
    namespace: String,
    include_metadata: bool,
}

#[derive(serde::Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(serde::Deserialize)]
struct QueryMatch {
    score: f32,
    #[serde(default)]
    metadata: Option<HashMap<String, serde_json::Value>>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest {
    delete_all: bool,
    namespace: String,
}

#[derive(serde::Deserialize)]
struct IndexStatsResponse {
    #[serde(default)]
    namespaces: HashMap<String, NamespaceStats>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceStats {
    vector_count: usize,
}

impl PineconeIndex {
    /// Create a new index client from configuration
    pub fn new(config: &IndexConfig, dimension: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            namespace: config.namespace.clone(),
            dimension,
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| Error::VectorDb("PINECONE_API_KEY is not set".to_string()))
    }

    async fn post_json<T: serde::Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        let api_key = self.api_key()?;
        self.client
            .post(format!("{}{}", self.host, path))
            .header("Api-Key", api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::VectorDb(format!("Index request failed: {}", e)))
    }
}

#[async_trait]
impl VectorStoreProvider for PineconeIndex {
    async fn upsert(&self, chunks: &[Chunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        for chunk in chunks {
            if chunk.embedding.len() != self.dimension {
                return Err(Error::VectorDb(format!(
                    "Vector dimension mismatch for chunk {}: expected {}, got {}",
                    chunk.id,
                    self.dimension,
                    chunk.embedding.len()
                )));
            }
        }

        let request = UpsertRequest {
            vectors: chunks
                .iter()
                .map(|chunk| VectorRecord {
                    id: chunk.id.to_string(),
                    values: chunk.embedding.clone(),
                    metadata: chunk.to_vector_metadata(),
                })
                .collect(),
            namespace: self.namespace.clone(),
        };

        let response = self.post_json("/vectors/upsert", &request).await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorDb(format!(
                "Upsert failed ({}): {}",
                status, body
            )));
        }

        let upsert: UpsertResponse = response
            .json()
            .await
            .map_err(|e| Error::VectorDb(format!("Failed to parse upsert response: {}", e)))?;

        Ok(upsert.upserted_count)
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<VectorSearchResult>> {
        let request = QueryRequest {
            vector: embedding.to_vec(),
            top_k,
            namespace: self.namespace.clone(),
            include_metadata: true,
        };

        let response = self.post_json("/query", &request).await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorDb(format!(
                "Query failed ({}): {}",
                status, body
            )));
        }

        let query: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::VectorDb(format!("Failed to parse query response: {}", e)))?;

        let results = query
            .matches
            .into_iter()
            .filter_map(|m| {
                let metadata = m.metadata?;
                Some(VectorSearchResult {
                    chunk: Chunk::from_vector_metadata(&metadata),
                    score: m.score,
                })
            })
            .collect();

        Ok(results)
    }

    async fn delete_all(&self) -> Result<()> {
        let request = DeleteRequest {
            delete_all: true,
            namespace: self.namespace.clone(),
        };

        let response = self.post_json("/vectors/delete", &request).await?;

        // A namespace that was never written to reports not-found; nothing to clear
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("Namespace '{}' not found, nothing to delete", self.namespace);
            return Ok(());
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorDb(format!(
                "Delete failed ({}): {}",
                status, body
            )));
        }

        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let response = self
            .post_json("/describe_index_stats", &serde_json::json!({}))
            .await?;

        if !response.status().is_success() {
            return Err(Error::VectorDb(format!(
                "Stats request failed: HTTP {}",
                response.status()
            )));
        }

        let stats: IndexStatsResponse = response
            .json()
            .await
            .map_err(|e| Error::VectorDb(format!("Failed to parse stats response: {}", e)))?;

        Ok(stats
            .namespaces
            .get(&self.namespace)
            .map(|n| n.vector_count)
            .unwrap_or(0))
    }

    async fn health_check(&self) -> Result<bool> {
        if self.api_key.is_none() {
            return Ok(false);
        }
        Ok(self.count().await.is_ok())
    }

    fn name(&self) -> &str {
        "pinecone"
    }
}
