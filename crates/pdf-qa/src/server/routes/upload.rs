//! PDF upload endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::error::{Error, Result};
use crate::ingestion::{ensure_pdf, ingested_message};
use crate::server::state::AppState;
use crate::types::UploadResponse;

/// Multipart field carrying the PDF
const FILE_FIELD: &str = "file";

/// POST /upload - Ingest one PDF
pub async fn upload_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::validation(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        ensure_pdf(&filename)?;

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::validation(format!("Failed to read file: {}", e)))?;

        tracing::info!("Received {} ({} bytes)", filename, data.len());

        state.ingestor().ingest(&filename, &data).await.map_err(|e| {
            tracing::error!("Ingestion of {} failed: {}", filename, e);
            e
        })?;

        return Ok(Json(UploadResponse {
            ok: true,
            message: ingested_message(&filename),
        }));
    }

    Err(Error::validation("No file uploaded"))
}
