//! Response types for the HTTP API

use serde::{Deserialize, Serialize};

use super::document::FileType;

/// Response from answering a question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// Answer text, generated or curated from excerpts
    pub answer: String,
    /// Whether the answer came from the LLM (false for excerpt fallback)
    pub generated: bool,
    /// Number of chunks retrieved for the question
    pub chunks_retrieved: usize,
    /// Mean similarity of the retrieved chunks (0.0-1.0)
    pub mean_relevance: f32,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Outcome of an ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// Filename that was ingested
    pub filename: String,
    /// Detected file type
    pub file_type: FileType,
    /// Number of chunks written to the index
    pub chunks_written: usize,
    /// Elapsed wall-clock time in milliseconds
    pub elapsed_ms: u64,
}

/// Response from a document upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Whether the upload and ingestion succeeded
    pub success: bool,
    /// Human-readable outcome message
    pub message: String,
    /// Uploaded filename
    pub filename: String,
    /// Upload size in bytes
    pub size_bytes: usize,
    /// Number of chunks written to the index
    pub chunks_written: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Response from deleting the active document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Whether the deletion succeeded
    pub success: bool,
    /// Human-readable outcome message
    pub message: String,
}

/// A preloaded file available in the data directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryFile {
    /// Filename
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Detected file type
    pub file_type: FileType,
}

/// Listing of preloaded files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryResponse {
    /// Available files
    pub files: Vec<LibraryFile>,
}

/// Request to load a preloaded file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadLibraryRequest {
    /// Filename within the data directory
    pub filename: String,
}

/// Embedding model warmup status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    /// Whether the model answered the warmup probe
    pub ready: bool,
    /// Status detail
    pub message: String,
}

impl Default for ModelStatus {
    fn default() -> Self {
        Self {
            ready: false,
            message: "Loading".to_string(),
        }
    }
}

/// Remaining rate-limit quota for a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaWindow {
    /// Requests remaining in the window
    pub remaining: usize,
    /// Window limit
    pub limit: usize,
}

/// Remaining quota across both windows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemainingQuota {
    /// Per-minute window
    pub minute: QuotaWindow,
    /// Per-hour window
    pub hour: QuotaWindow,
}
