//! Configuration for the question-answering service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Embedding configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Vector index configuration
    #[serde(default)]
    pub index: IndexConfig,
    /// Rate limit configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when absent
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply environment-variable overrides for credentials and addressing
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("PINECONE_API_KEY") {
            if !key.is_empty() {
                self.index.api_key = Some(key);
            }
        }
        if let Ok(host) = std::env::var("PINECONE_INDEX_HOST") {
            if !host.is_empty() {
                self.index.host = host;
            }
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                self.llm.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("EMBEDDINGS_URL") {
            if !url.is_empty() {
                self.embedding.base_url = url;
            }
        }
    }

    /// Dimension of the vector index, always tied to the embedding profile
    pub fn index_dimension(&self) -> usize {
        self.embedding.profile.dimensions()
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 15MB)
    pub max_upload_size: usize,
    /// Directory holding the active uploaded document
    pub uploads_dir: PathBuf,
    /// Directory holding preloaded documents
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_size: 15 * 1024 * 1024, // 15MB
            uploads_dir: PathBuf::from("uploads"),
            data_dir: PathBuf::from("data"),
        }
    }
}

/// Embedding model profile, trading speed against retrieval quality
///
/// The index dimension must match the selected profile; switching profiles
/// requires rebuilding the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProfile {
    /// all-MiniLM-L6-v2, 384 dimensions
    Fast,
    /// bge-base-en-v1.5, 768 dimensions
    Balanced,
    /// bge-large-en-v1.5, 1024 dimensions
    #[default]
    Quality,
}

impl EmbeddingProfile {
    /// Model name served by the embedding endpoint
    pub fn model_name(&self) -> &'static str {
        match self {
            Self::Fast => "all-minilm",
            Self::Balanced => "bge-base-en-v1.5",
            Self::Quality => "bge-large-en-v1.5",
        }
    }

    /// Vector dimension produced by the model
    pub fn dimensions(&self) -> usize {
        match self {
            Self::Fast => 384,
            Self::Balanced => 768,
            Self::Quality => 1024,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model profile
    pub profile: EmbeddingProfile,
    /// Base URL of the embedding endpoint
    pub base_url: String,
    /// Batch size for embedding generation
    pub batch_size: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            profile: EmbeddingProfile::Quality,
            base_url: "http://localhost:11434".to_string(),
            batch_size: 32,
            timeout_secs: 120,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Window size in words
    pub split_length: usize,
    /// Overlap between windows in words
    pub split_overlap: usize,
    /// Hard per-chunk character limit imposed by the index metadata size cap
    pub max_chunk_chars: usize,
    /// Files at or above this size use the large-file settings
    pub large_file_threshold: u64,
    /// Window size in words for large files
    pub large_file_split_length: usize,
    /// Embedding batch size for large files
    pub large_file_batch_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            split_length: 300,
            split_overlap: 15,
            max_chunk_chars: 10_000,
            large_file_threshold: 2 * 1024 * 1024, // 2MB
            large_file_split_length: 400,
            large_file_batch_size: 48,
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Generation model name
    pub model: String,
    /// API key (from GEMINI_API_KEY)
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Nucleus sampling parameter
    pub top_p: f32,
    /// Generation attempts before falling back to excerpts
    pub max_retries: u32,
    /// Base delay between rate-limited attempts, grows linearly per attempt
    pub retry_delay_secs: u64,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
            temperature: 0.7,
            max_output_tokens: 2000,
            top_p: 0.95,
            max_retries: 3,
            retry_delay_secs: 8,
            timeout_secs: 120,
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Index service host URL
    pub host: String,
    /// API key (from PINECONE_API_KEY)
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Index name
    pub name: String,
    /// Namespace isolating the active document's vectors
    pub namespace: String,
    /// Similarity metric
    pub metric: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:5080".to_string(),
            api_key: None,
            name: "scholar-rag".to_string(),
            namespace: "default".to_string(),
            metric: "cosine".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Rate limit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per IP per minute
    pub requests_per_minute: usize,
    /// Requests allowed per IP per hour
    pub requests_per_hour: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 30,
            requests_per_hour: 500,
        }
    }
}
