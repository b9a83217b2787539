//! Current-document status record

use serde::{Deserialize, Serialize};

/// Lifecycle state of the single active document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// No document has been uploaded
    #[default]
    NoDocument,
    /// Upload received, ingestion in progress
    Processing,
    /// Ingestion complete, questions allowed
    Ready,
    /// Ingestion failed
    Failed,
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDocument => write!(f, "No document uploaded"),
            Self::Processing => write!(f, "Processing"),
            Self::Ready => write!(f, "Ready"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Process-wide record of the active document
///
/// Held behind a lock in the application state; a new upload replaces the
/// previous record entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentDocument {
    /// Filename of the active document, if any
    pub filename: Option<String>,
    /// Lifecycle state
    pub status: DocumentStatus,
    /// Ingestion progress percentage (0-100)
    pub progress: u8,
}

impl CurrentDocument {
    /// Mark a new upload as processing
    pub fn start_processing(&mut self, filename: String) {
        self.filename = Some(filename);
        self.status = DocumentStatus::Processing;
        self.progress = 10;
    }

    /// Update the progress percentage
    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress.min(100);
    }

    /// Mark ingestion as complete
    pub fn mark_ready(&mut self) {
        self.status = DocumentStatus::Ready;
        self.progress = 100;
    }

    /// Mark ingestion as failed and drop the filename
    pub fn mark_failed(&mut self) {
        self.filename = None;
        self.status = DocumentStatus::Failed;
        self.progress = 0;
    }

    /// Reset to the no-document state
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether questions are currently allowed
    pub fn is_ready(&self) -> bool {
        self.status == DocumentStatus::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut doc = CurrentDocument::default();
        assert_eq!(doc.status, DocumentStatus::NoDocument);
        assert!(!doc.is_ready());

        doc.start_processing("paper.pdf".to_string());
        assert_eq!(doc.status, DocumentStatus::Processing);
        assert_eq!(doc.progress, 10);

        doc.mark_ready();
        assert!(doc.is_ready());
        assert_eq!(doc.progress, 100);

        doc.mark_failed();
        assert_eq!(doc.status, DocumentStatus::Failed);
        assert!(doc.filename.is_none());

        doc.clear();
        assert_eq!(doc.status, DocumentStatus::NoDocument);
    }
}
