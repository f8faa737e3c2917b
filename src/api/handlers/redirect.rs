//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Lookup, caching and cache fallback live in
/// [`crate::application::services::ResolutionService`].
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist or was deleted.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let original_url = state.resolution_service.resolve(&code).await?;

    Ok(Redirect::temporary(&original_url))
}
