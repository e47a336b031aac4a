//! Book endpoints (admin only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    error::{AppError, AppResult},
    models::book::{BookListResponse, BookResponse, CreateBookRequest, UpdateBookRequest},
};

use super::AuthenticatedUser;

/// List books
#[utoipa::path(
    get,
    path = "/books",
    tag = "catalog",
    security(("api_key" = [])),
    responses(
        (status = 200, description = "All books", body = BookListResponse),
        (status = 401, description = "Missing, unknown or non-admin API key")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<BookListResponse>> {
    principal.require_admin()?;
    let books = state.services.catalog.list_books().await?;
    Ok(Json(BookListResponse { books }))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "catalog",
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book", body = BookResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BookResponse>> {
    principal.require_admin()?;
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(BookResponse { book }))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "catalog",
    security(("api_key" = [])),
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 422, description = "Missing title or unknown author")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateBookRequest>, AppError>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    principal.require_admin()?;
    let book = state.services.catalog.create_book(request.book).await?;
    Ok((StatusCode::CREATED, Json(BookResponse { book })))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "catalog",
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 422, description = "Blank title or unknown author")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateBookRequest>, AppError>,
) -> AppResult<Json<BookResponse>> {
    principal.require_admin()?;
    let book = state.services.catalog.update_book(id, request.book).await?;
    Ok(Json(BookResponse { book }))
}

/// Delete a book without copies
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "catalog",
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 422, description = "Book still has copies")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    principal.require_admin()?;
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
