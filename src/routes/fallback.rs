//! Fallback route.

use crate::error::AppError;
use axum::{http::Uri, response::IntoResponse};

/// Respond with a JSON-API 404 for any unknown route.
pub async fn notfound_404(uri: Uri) -> impl IntoResponse {
    AppError::not_found(uri.path())
}
