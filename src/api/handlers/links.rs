//! Handlers for link management endpoints (create, list, rename, delete).
//!
//! All routes here sit behind [`crate::api::middleware::auth`], which places the
//! caller's [`Principal`] in request extensions. Every operation is scoped to it.

use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::links::{CreateLinkRequest, LinkListResponse, LinkResponse, RenameLinkRequest};
use crate::api::dto::pagination::{PageMeta, PaginationParams};
use crate::application::services::Principal;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link owned by the caller.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "custom_alias": "my-link"   // optional
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "id": 1,
///   "original_url": "https://example.com/some/long/path",
///   "short_code": "my-link",
///   "short_url": "https://sho.rt/my-link",
///   "created_at": "2026-01-01T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 `invalid_url` / `invalid_alias` / `validation_error`
/// - 409 `duplicate_alias` if the alias is taken
/// - 503 `allocation_exhausted` if no free code could be found
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let Json(payload) = payload?;

    let link = state
        .allocation_service
        .create(
            &payload.url,
            payload.custom_alias.as_deref(),
            Some(principal.token_id),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(link, &state.public_base_url)),
    ))
}

/// Lists the caller's links, newest first.
///
/// # Endpoint
///
/// `GET /api/links?page=1&page_size=25`
///
/// # Errors
///
/// Returns 400 `validation_error` if `page` is 0 or `page_size` is outside 1-100.
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    params: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<LinkListResponse>, AppError> {
    let Query(params) = params?;
    params.validate()?;

    let (page, page_size) = params.resolve();
    let (links, total) = state
        .lifecycle_service
        .list(principal.token_id, page, page_size)
        .await?;

    let items = links
        .into_iter()
        .map(|link| LinkResponse::from_link(link, &state.public_base_url))
        .collect();

    Ok(Json(LinkListResponse {
        pagination: PageMeta {
            page,
            page_size,
            total,
        },
        items,
    }))
}

/// Moves a link to a new short code.
///
/// # Endpoint
///
/// `PATCH /api/links/{id}`
///
/// # Request Body
///
/// ```json
/// { "short_code": "new-code" }
/// ```
///
/// The old code stops resolving immediately and becomes available again.
///
/// # Errors
///
/// - 400 `invalid_alias` if the new code breaks the code rules
/// - 404 `not_found` if the link does not exist or belongs to another caller
/// - 409 `duplicate_alias` if the new code is taken
pub async fn rename_link_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RenameLinkRequest>, JsonRejection>,
) -> Result<Json<LinkResponse>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;

    let link = state
        .lifecycle_service
        .rename(id, &payload.short_code, Some(principal.token_id))
        .await?;

    Ok(Json(LinkResponse::from_link(link, &state.public_base_url)))
}

/// Deletes a link. Its code is retired and never resolves again.
///
/// # Endpoint
///
/// `DELETE /api/links/{id}`
///
/// # Errors
///
/// Returns 404 `not_found` if the link does not exist, was already deleted, or
/// belongs to another caller.
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;

    state
        .lifecycle_service
        .delete(id, Some(principal.token_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
