//! Diagnostic endpoints: collection peek and retrieval without synthesis

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::DebugError;
use crate::retrieval::diagnostic::{validate_k, DEFAULT_K};
use crate::retrieval::inspect::{validate_peek, DEFAULT_PEEK};
use crate::server::state::AppState;
use crate::types::{AskRequest, PeekResponse, RetrieveResponse};

/// Query parameters of `GET /debug/vdb`
#[derive(Debug, Default, Deserialize)]
pub struct PeekParams {
    /// Rows to sample (1..=20)
    pub peek: Option<i64>,
}

/// Query parameters of `POST /debug/retrieve`
#[derive(Debug, Default, Deserialize)]
pub struct RetrieveParams {
    /// Hits to return (1..=10)
    pub k: Option<i64>,
}

/// GET /debug/vdb - Collection count and a sample of stored chunks
pub async fn peek_collection(
    State(state): State<AppState>,
    Query(params): Query<PeekParams>,
) -> Result<Json<PeekResponse>, DebugError> {
    let n = validate_peek(params.peek.unwrap_or(DEFAULT_PEEK))?;
    Ok(Json(state.inspector().peek(n).await?))
}

/// POST /debug/retrieve - Ranked chunks for a question, no answer
pub async fn retrieve(
    State(state): State<AppState>,
    Query(params): Query<RetrieveParams>,
    Json(request): Json<AskRequest>,
) -> Result<Json<RetrieveResponse>, DebugError> {
    let k = validate_k(params.k.unwrap_or(DEFAULT_K))?;
    Ok(Json(state.diagnostic().retrieve(&request.question, k).await?))
}
