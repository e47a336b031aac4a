//! Author endpoints (admin only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    error::{AppError, AppResult},
    models::author::{AuthorListResponse, AuthorResponse, CreateAuthorRequest, UpdateAuthorRequest},
};

use super::AuthenticatedUser;

/// List authors
#[utoipa::path(
    get,
    path = "/authors",
    tag = "catalog",
    security(("api_key" = [])),
    responses(
        (status = 200, description = "All authors", body = AuthorListResponse),
        (status = 401, description = "Missing, unknown or non-admin API key")
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<AuthorListResponse>> {
    principal.require_admin()?;
    let authors = state.services.catalog.list_authors().await?;
    Ok(Json(AuthorListResponse { authors }))
}

/// Get an author by ID
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "catalog",
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author", body = AuthorResponse),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorResponse>> {
    principal.require_admin()?;
    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(AuthorResponse { author }))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "catalog",
    security(("api_key" = [])),
    request_body = CreateAuthorRequest,
    responses(
        (status = 201, description = "Author created", body = AuthorResponse),
        (status = 422, description = "First or last name missing")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateAuthorRequest>, AppError>,
) -> AppResult<(StatusCode, Json<AuthorResponse>)> {
    principal.require_admin()?;
    let author = state.services.catalog.create_author(request.author).await?;
    Ok((StatusCode::CREATED, Json(AuthorResponse { author })))
}

/// Update an author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "catalog",
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    request_body = UpdateAuthorRequest,
    responses(
        (status = 200, description = "Author updated", body = AuthorResponse),
        (status = 422, description = "Blank name")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateAuthorRequest>, AppError>,
) -> AppResult<Json<AuthorResponse>> {
    principal.require_admin()?;
    let author = state.services.catalog.update_author(id, request.author).await?;
    Ok(Json(AuthorResponse { author }))
}

/// Delete an author without books
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "catalog",
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 422, description = "Author still has books")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    principal.require_admin()?;
    state.services.catalog.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
