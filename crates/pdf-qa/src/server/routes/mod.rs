//! API routes for the PDF Q&A server

pub mod ask;
pub mod debug;
pub mod upload;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Ingestion - with larger body limit for file uploads
        .route(
            "/upload",
            post(upload::upload_pdf).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/ask", post(ask::ask))
        // Diagnostics
        .route("/debug/vdb", get(debug::peek_collection))
        .route("/debug/retrieve", post(debug::retrieve))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config();
    Json(serde_json::json!({
        "name": "pdf-qa",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Question answering over uploaded PDFs with page citations",
        "engine": state.engine().name(),
        "embedder": state.embedder().name(),
        "collection": config.vector_db.collection_name,
        "top_k": config.retrieval.top_k,
        "endpoints": {
            "POST /upload": "Upload and ingest a PDF",
            "POST /ask": "Ask a question, answered only from ingested PDFs",
            "GET /debug/vdb?peek=N": "Collection count and a sample of stored chunks",
            "POST /debug/retrieve?k=N": "Retrieved chunks for a question, without an answer"
        }
    }))
}
