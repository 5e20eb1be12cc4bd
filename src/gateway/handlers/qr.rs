use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::gateway::state::AppState;
use crate::qr::is_valid_key;

/// GET /qrcodes/{file}
pub async fn qr_image(State(state): State<Arc<AppState>>, Path(file): Path<String>) -> Response {
    if !is_valid_key(&file) {
        return StatusCode::NOT_FOUND.into_response();
    }

    match state.qr.read(&file).await {
        Ok(Some(bytes)) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            tracing::error!(error = %e, file = %file, "Failed to read QR artifact");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
