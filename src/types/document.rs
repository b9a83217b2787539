//! Document and chunk types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Supported file types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Old Microsoft Word document (.doc)
    Doc,
    /// Plain text file
    Txt,
    /// Markdown file
    Markdown,
    /// CSV file
    Csv,
    /// Excel spreadsheet (.xlsx)
    Xlsx,
    /// Old Excel spreadsheet (.xls)
    Xls,
    /// JSON file
    Json,
    /// Unknown file type
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "doc" => Self::Doc,
            "txt" | "text" => Self::Txt,
            "md" | "markdown" => Self::Markdown,
            "csv" => Self::Csv,
            "xlsx" => Self::Xlsx,
            "xls" => Self::Xls,
            "json" => Self::Json,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a filename
    pub fn from_filename(filename: &str) -> Self {
        let ext = filename.rsplit('.').next().unwrap_or("");
        if ext == filename {
            return Self::Unknown;
        }
        Self::from_extension(ext)
    }

    /// Check if this is a supported file type
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (.docx)",
            Self::Doc => "Word Document (.doc)",
            Self::Txt => "Text File",
            Self::Markdown => "Markdown",
            Self::Csv => "CSV",
            Self::Xlsx => "Excel Spreadsheet (.xlsx)",
            Self::Xls => "Excel Spreadsheet (.xls)",
            Self::Json => "JSON",
            Self::Unknown => "Unknown",
        }
    }
}

/// A document that has been ingested
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Original filename as uploaded
    pub filename: String,
    /// File type
    pub file_type: FileType,
    /// Content hash
    pub content_hash: String,
    /// File size in bytes
    pub file_size: u64,
    /// Total number of chunks written
    pub total_chunks: u32,
    /// Ingestion timestamp
    pub ingested_at: chrono::DateTime<chrono::Utc>,
}

impl Document {
    /// Create a new document
    pub fn new(filename: String, file_type: FileType, content_hash: String, file_size: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            file_type,
            content_hash,
            file_size,
            total_chunks: 0,
            ingested_at: chrono::Utc::now(),
        }
    }
}

/// A chunk of text from a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Parent document ID
    pub document_id: Uuid,
    /// Text content
    pub content: String,
    /// Embedding vector, empty until embedded
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embedding: Vec<f32>,
    /// Source filename
    pub filename: String,
    /// Source file type
    pub file_type: FileType,
    /// Chunk index within the document
    pub chunk_index: u32,
    /// Sub-chunk ordinal when an oversized chunk was sliced further
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sub_chunk: Option<u32>,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(
        document_id: Uuid,
        content: String,
        filename: String,
        file_type: FileType,
        chunk_index: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            content,
            embedding: Vec::new(),
            filename,
            file_type,
            chunk_index,
            sub_chunk: None,
        }
    }

    /// Convert to vector metadata for index storage
    pub fn to_vector_metadata(&self) -> HashMap<String, serde_json::Value> {
        let mut meta = HashMap::new();
        meta.insert("chunk_id".to_string(), serde_json::json!(self.id.to_string()));
        meta.insert(
            "document_id".to_string(),
            serde_json::json!(self.document_id.to_string()),
        );
        meta.insert("filename".to_string(), serde_json::json!(self.filename));
        meta.insert("file_type".to_string(), serde_json::json!(self.file_type));
        meta.insert("chunk_index".to_string(), serde_json::json!(self.chunk_index));
        meta.insert("content".to_string(), serde_json::json!(self.content));

        if let Some(sub) = self.sub_chunk {
            meta.insert("sub_chunk".to_string(), serde_json::json!(sub));
        }

        meta
    }

    /// Rebuild a chunk from index metadata returned by a query
    pub fn from_vector_metadata(meta: &HashMap<String, serde_json::Value>) -> Self {
        let parse_uuid = |key: &str| {
            meta.get(key)
                .and_then(|v| v.as_str())
                .and_then(|s| Uuid::parse_str(s).ok())
                .unwrap_or_else(Uuid::nil)
        };

        let file_type = meta
            .get("file_type")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(FileType::Unknown);

        Self {
            id: parse_uuid("chunk_id"),
            document_id: parse_uuid("document_id"),
            content: meta
                .get("content")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            embedding: Vec::new(),
            filename: meta
                .get("filename")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            file_type,
            chunk_index: meta
                .get("chunk_index")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
            sub_chunk: meta.get("sub_chunk").and_then(|v| v.as_u64()).map(|v| v as u32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_detection() {
        assert_eq!(FileType::from_filename("paper.pdf"), FileType::Pdf);
        assert_eq!(FileType::from_filename("notes.MD"), FileType::Markdown);
        assert_eq!(FileType::from_filename("data.xlsx"), FileType::Xlsx);
        assert_eq!(FileType::from_filename("archive.tar.gz"), FileType::Unknown);
        assert_eq!(FileType::from_filename("noextension"), FileType::Unknown);
    }

    #[test]
    fn test_metadata_round_trip() {
        let doc_id = Uuid::new_v4();
        let mut chunk = Chunk::new(
            doc_id,
            "attention is all you need".to_string(),
            "paper.pdf".to_string(),
            FileType::Pdf,
            3,
        );
        chunk.sub_chunk = Some(1);

        let restored = Chunk::from_vector_metadata(&chunk.to_vector_metadata());
        assert_eq!(restored.id, chunk.id);
        assert_eq!(restored.document_id, doc_id);
        assert_eq!(restored.content, chunk.content);
        assert_eq!(restored.chunk_index, 3);
        assert_eq!(restored.sub_chunk, Some(1));
        assert_eq!(restored.file_type, FileType::Pdf);
    }
}
