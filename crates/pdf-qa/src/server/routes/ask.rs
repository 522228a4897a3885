//! Question answering endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{AskRequest, AskResponse};

/// POST /ask - Answer a question from the ingested PDFs
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    let answer = state
        .synthesizer()
        .answer(&request.question)
        .await
        .map_err(|e| {
            if !e.is_client_error() {
                tracing::error!("Answering failed: {}", e);
            }
            e
        })?;

    Ok(Json(answer.into()))
}
