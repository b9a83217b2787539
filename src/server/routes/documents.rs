//! Document status and deletion endpoints

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::response::DeleteResponse;
use crate::types::CurrentDocument;

use super::upload::clear_directory;

/// GET /api/status - Current document status
pub async fn document_status(State(state): State<AppState>) -> Json<CurrentDocument> {
    Json(state.current_document())
}

/// DELETE /api/document - Delete the active document and clear its vectors
pub async fn delete_document(State(state): State<AppState>) -> Result<Json<DeleteResponse>> {
    // Clearing an already-empty namespace is not an error
    if let Err(e) = state.store().delete_all().await {
        tracing::warn!("Vector cleanup warning: {}", e);
    } else {
        tracing::info!("Cleared vectors from index");
    }

    clear_directory(&state.config().server.uploads_dir).await?;

    let filename = state.current_document().filename;
    state.update_document(|doc| doc.clear());

    let message = match filename {
        Some(name) => format!("Document '{}' deleted successfully", name),
        None => "Document deleted successfully".to_string(),
    };

    tracing::info!("{}", message);

    Ok(Json(DeleteResponse {
        success: true,
        message,
    }))
}
