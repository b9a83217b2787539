//! API routes for the question-answering server

pub mod answer;
pub mod documents;
pub mod library;
pub mod preview;
pub mod upload;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use std::net::SocketAddr;

use crate::server::limiter::client_ip;
use crate::server::state::AppState;

/// Multipart framing allowance on top of the configured file size limit
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Build all API routes
pub fn api_routes(state: &AppState) -> Router<AppState> {
    let max_upload = state.config().server.max_upload_size;

    Router::new()
        // Upload carries its own body limit; the handler enforces the
        // configured file size before anything touches disk
        .route(
            "/upload",
            post(upload::upload_document)
                .layer(DefaultBodyLimit::max(max_upload + MULTIPART_OVERHEAD)),
        )
        // Document management
        .route("/status", get(documents::document_status))
        .route("/document", delete(documents::delete_document))
        // Question answering
        .route("/answer", post(answer::ask_question))
        // Preview
        .route("/preview", get(preview::preview_current))
        .route("/preview/:filename", get(preview::preview_file))
        // Preloaded files
        .route("/library", get(library::list_library))
        .route("/library/load", post(library::load_library_file))
        // Service info
        .route("/model", get(model_status))
        .route("/limits", get(rate_limits))
        .route("/info", get(info))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
}

/// Per-IP rate limiting applied to every API route
async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let fallback = request
        .extensions()
        .get::<axum::extract::ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let ip = client_ip(request.headers(), fallback);

    match state.limiter().check(&ip) {
        Ok(()) => next.run(request).await,
        Err(denied) => {
            tracing::warn!("Rate limited {}: {}", ip, denied.message);
            let body = Json(serde_json::json!({
                "error": {
                    "type": "rate_limited",
                    "message": denied.message,
                    "retry_after_secs": denied.retry_after_secs,
                    "remaining": state.limiter().remaining(&ip),
                }
            }));
            (axum::http::StatusCode::TOO_MANY_REQUESTS, body).into_response()
        }
    }
}

/// GET /api/model - Embedding model warmup status
async fn model_status(State(state): State<AppState>) -> Json<crate::types::response::ModelStatus> {
    Json(state.model_status())
}

/// GET /api/limits - Remaining rate-limit quota for the caller
async fn rate_limits(
    State(state): State<AppState>,
    request: Request,
) -> Json<crate::types::response::RemainingQuota> {
    let fallback = request
        .extensions()
        .get::<axum::extract::ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let ip = client_ip(request.headers(), fallback);
    Json(state.limiter().remaining(&ip))
}

/// GET /api/info - API info endpoint
async fn info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "scholar-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Question answering over uploaded research documents",
        "endpoints": {
            "POST /api/upload": "Upload and process a document",
            "POST /api/answer": "Ask a question about the active document",
            "GET /api/status": "Current document status",
            "DELETE /api/document": "Delete the active document",
            "GET /api/preview": "Preview the active document",
            "GET /api/preview/{filename}": "Preview an uploaded or preloaded file",
            "GET /api/library": "List preloaded documents",
            "POST /api/library/load": "Load a preloaded document",
            "GET /api/model": "Embedding model status"
        }
    }))
}
