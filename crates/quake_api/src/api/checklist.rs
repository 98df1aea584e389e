//! First-aid checklist download.

use std::io::ErrorKind;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::error;

use super::ApiError;
use crate::AppState;

const DOWNLOAD_NAME: &str = "first-aid-checklist.pdf";

/// GET /api/pdf/first-aid-checklist
pub async fn download_checklist(State(state): State<AppState>) -> Result<Response, ApiError> {
    let path = &state.config.server.checklist_pdf_path;

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ApiError::NotFound("Checklist PDF not found".into()));
        }
        Err(e) => {
            error!("Failed to read checklist PDF {}: {}", path, e);
            return Err(ApiError::Internal("Checklist PDF could not be read".into()));
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_NAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
