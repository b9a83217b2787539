//! Question-answering endpoint

use axum::{extract::State, Json};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{AnswerRequest, AnswerResponse};

/// POST /api/answer - Ask a question about the active document
pub async fn ask_question(
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>> {
    if request.question.trim().is_empty() {
        return Err(Error::Validation("Question must not be empty".to_string()));
    }

    // Only a fully ingested document may be queried
    let current = state.current_document();
    if !current.is_ready() {
        return Err(Error::NoActiveDocument);
    }

    tracing::info!(
        "Question for '{}': style={:?} length={:?}",
        current.filename.as_deref().unwrap_or("unknown"),
        request.style,
        request.length
    );

    let pipeline = state.answer_pipeline();
    let response = pipeline
        .answer(&request.question, request.style, request.length)
        .await?;

    Ok(Json(response))
}
