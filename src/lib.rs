//! scholar-rag: retrieval-augmented question answering for research documents
//!
//! A user uploads one document; it is converted to plain text, chunked into
//! overlapping word windows, embedded, and upserted into a namespaced vector
//! index. Questions are answered by retrieving the nearest chunks and asking
//! an LLM for a grounded answer, with linear retry on rate limits and a
//! deterministic excerpt fallback when generation stays unavailable.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::{
    document::{Chunk, Document, FileType},
    query::{AnswerLength, AnswerRequest, AnswerStyle},
    response::{AnswerResponse, UploadResponse},
    status::{CurrentDocument, DocumentStatus},
};
