//! Preloaded document endpoints

use axum::{extract::State, Json};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::response::{LibraryFile, LibraryResponse, LoadLibraryRequest};
use crate::types::{FileType, UploadResponse};

use super::upload::{ingest_saved_file, sanitize_filename};

/// GET /api/library - List preloaded documents in the data directory
pub async fn list_library(State(state): State<AppState>) -> Result<Json<LibraryResponse>> {
    let data_dir = &state.config().server.data_dir;
    let mut files = Vec::new();

    if data_dir.is_dir() {
        let mut entries = tokio::fs::read_dir(data_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            let file_type = FileType::from_filename(&name);
            if !file_type.is_supported() {
                continue;
            }

            let size = entry.metadata().await.map(|m| m.len()).unwrap_or(0);
            files.push(LibraryFile {
                name,
                size,
                file_type,
            });
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(LibraryResponse { files }))
}

/// POST /api/library/load - Load a preloaded document through ingestion
pub async fn load_library_file(
    State(state): State<AppState>,
    Json(request): Json<LoadLibraryRequest>,
) -> Result<Json<UploadResponse>> {
    let filename = request.filename;
    sanitize_filename(&filename)?;

    let file_type = FileType::from_filename(&filename);
    if !file_type.is_supported() {
        return Err(Error::UnsupportedFileType(filename));
    }

    let path = state.config().server.data_dir.join(&filename);
    if !path.is_file() {
        return Err(Error::DocumentNotFound(filename));
    }

    let data = tokio::fs::read(&path).await?;
    tracing::info!(
        "Loading preloaded file: {} ({:.2}MB)",
        filename,
        data.len() as f64 / (1024.0 * 1024.0)
    );

    let response = ingest_saved_file(&state, &filename, &data).await?;
    Ok(Json(response))
}
