//! Core types for documents, chunks, queries, and responses

pub mod document;
pub mod query;
pub mod response;
pub mod status;

pub use document::{Chunk, Document, FileType};
pub use query::{AnswerLength, AnswerRequest, AnswerStyle};
pub use response::{AnswerResponse, IngestReport, UploadResponse};
pub use status::{CurrentDocument, DocumentStatus};
