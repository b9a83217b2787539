//! Document upload endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::path::Path;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{FileType, UploadResponse};

/// POST /api/upload - Upload and process a document
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let limit = state.config().server.max_upload_size;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        Error::Validation(format!("Failed to read multipart field: {}", e))
    })? {
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };

        sanitize_filename(&filename)?;

        let file_type = FileType::from_filename(&filename);
        if !file_type.is_supported() {
            return Err(Error::UnsupportedFileType(format!(
                "'{}'. Supported formats: PDF, DOCX, DOC, TXT, MD, CSV, JSON, XLSX, XLS",
                filename.rsplit('.').next().unwrap_or(""),
            )));
        }

        // Stream the field so oversized uploads are rejected before any
        // bytes reach disk
        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| {
            Error::Validation(format!("Failed to read upload: {}", e))
        })? {
            if data.len() + chunk.len() > limit {
                return Err(Error::PayloadTooLarge {
                    size: data.len() + chunk.len(),
                    limit,
                });
            }
            data.extend_from_slice(&chunk);
        }

        upload = Some((filename, data));
        break;
    }

    let (filename, data) = upload.ok_or_else(|| Error::Validation("No file provided".to_string()))?;

    if data.is_empty() {
        return Err(Error::EmptyUpload);
    }

    tracing::info!("Upload received: {} ({} bytes)", filename, data.len());

    let response = ingest_saved_file(&state, &filename, &data).await?;
    Ok(Json(response))
}

/// Save an upload and drive it through the ingestion pipeline, keeping the
/// current-document record in sync. Shared with the preloaded-file loader.
pub(crate) async fn ingest_saved_file(
    state: &AppState,
    filename: &str,
    data: &[u8],
) -> Result<UploadResponse> {
    let start = Instant::now();
    let uploads_dir = state.config().server.uploads_dir.clone();

    clear_directory(&uploads_dir).await?;

    let path = uploads_dir.join(filename);
    tokio::fs::write(&path, data).await?;

    state.update_document(|doc| doc.start_processing(filename.to_string()));
    state.update_document(|doc| doc.set_progress(30));

    let pipeline = state.ingest_pipeline();
    state.update_document(|doc| doc.set_progress(50));

    match pipeline.ingest(filename, data).await {
        Ok(report) => {
            state.update_document(|doc| {
                doc.set_progress(90);
                doc.mark_ready();
            });

            Ok(UploadResponse {
                success: true,
                message: format!(
                    "Document '{}' ({:.1}MB) uploaded and processed successfully",
                    filename,
                    data.len() as f64 / (1024.0 * 1024.0)
                ),
                filename: filename.to_string(),
                size_bytes: data.len(),
                chunks_written: report.chunks_written,
                processing_time_ms: start.elapsed().as_millis() as u64,
            })
        }
        Err(e) => {
            tracing::error!("Failed to process {}: {}", filename, e);
            let _ = tokio::fs::remove_file(&path).await;
            state.update_document(|doc| doc.mark_failed());
            Err(e)
        }
    }
}

/// Reject filenames that could escape the uploads directory
pub(crate) fn sanitize_filename(filename: &str) -> Result<()> {
    let path = Path::new(filename);
    let is_plain = path.components().count() == 1
        && !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\');

    if filename.is_empty() || !is_plain {
        return Err(Error::Validation(format!("Invalid filename: {}", filename)));
    }
    Ok(())
}

/// Remove everything in the directory, creating it if missing
pub(crate) async fn clear_directory(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir).await?;

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
            if let Err(e) = tokio::fs::remove_file(entry.path()).await {
                tracing::warn!("Could not delete {:?}: {}", entry.path(), e);
            }
        }
    }

    Ok(())
}
