use crate::{server::SharedState, storage::StorageError};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::instrument;

#[instrument(skip(state))]
pub async fn serve_upload(
    State(state): State<SharedState>,
    Path(filename): Path<String>,
) -> Response {
    state.metrics.record_request("/uploads");

    match state.uploads.read(&filename) {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, content_type_for(&filename))],
            bytes,
        )
            .into_response(),
        Err(e @ (StorageError::NotFound(_) | StorageError::InvalidName(_))) => {
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to serve upload {}: {:?}", filename, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

fn content_type_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
