//! Book copy endpoints: admin CRUD plus borrow/return for every principal

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    error::{AppError, AppResult},
    models::book_copy::{
        BookCopyListResponse, BookCopyResponse, BookCopySerializer, BorrowRequest, CreateBookCopyRequest,
        UpdateBookCopyRequest,
    },
};

use super::AuthenticatedUser;

/// The borrow/return body may be left out entirely, but a body that is sent must parse
fn borrow_request(body: Result<Json<BorrowRequest>, JsonRejection>) -> AppResult<BorrowRequest> {
    match body {
        Ok(Json(request)) => Ok(request),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(BorrowRequest::default()),
        Err(rejection) => Err(rejection.into()),
    }
}

/// List all book copies
#[utoipa::path(
    get,
    path = "/book_copies",
    tag = "book_copies",
    security(("api_key" = [])),
    responses(
        (status = 200, description = "All book copies", body = BookCopyListResponse),
        (status = 401, description = "Missing, unknown or non-admin API key")
    )
)]
pub async fn list_book_copies(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<BookCopyListResponse>> {
    principal.require_admin()?;

    let copies = state.services.book_copies.list().await?;
    Ok(Json(BookCopyListResponse {
        book_copies: copies.iter().map(BookCopySerializer::from).collect(),
    }))
}

/// Get a book copy by ID
#[utoipa::path(
    get,
    path = "/book_copies/{id}",
    tag = "book_copies",
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Book copy ID")),
    responses(
        (status = 200, description = "Book copy", body = BookCopyResponse),
        (status = 401, description = "Missing, unknown or non-admin API key"),
        (status = 404, description = "Book copy not found")
    )
)]
pub async fn get_book_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BookCopyResponse>> {
    principal.require_admin()?;

    let copy = state.services.book_copies.get_by_id(id).await?;
    Ok(Json(BookCopyResponse::from(&copy)))
}

/// Create a book copy
#[utoipa::path(
    post,
    path = "/book_copies",
    tag = "book_copies",
    security(("api_key" = [])),
    request_body = CreateBookCopyRequest,
    responses(
        (status = 201, description = "Book copy created", body = BookCopyResponse),
        (status = 401, description = "Missing, unknown or non-admin API key"),
        (status = 422, description = "Missing or invalid attributes")
    )
)]
pub async fn create_book_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateBookCopyRequest>, AppError>,
) -> AppResult<(StatusCode, Json<BookCopyResponse>)> {
    principal.require_admin()?;

    let copy = state.services.book_copies.create(request.book_copy).await?;
    Ok((StatusCode::CREATED, Json(BookCopyResponse::from(&copy))))
}

/// Update a book copy's attributes
#[utoipa::path(
    put,
    path = "/book_copies/{id}",
    tag = "book_copies",
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Book copy ID")),
    request_body = UpdateBookCopyRequest,
    responses(
        (status = 200, description = "Book copy updated", body = BookCopyResponse),
        (status = 401, description = "Missing, unknown or non-admin API key"),
        (status = 404, description = "Book copy not found"),
        (status = 422, description = "Invalid attributes")
    )
)]
pub async fn update_book_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateBookCopyRequest>, AppError>,
) -> AppResult<Json<BookCopyResponse>> {
    principal.require_admin()?;

    let copy = state.services.book_copies.update(id, request.book_copy).await?;
    Ok(Json(BookCopyResponse::from(&copy)))
}

/// Delete a book copy
#[utoipa::path(
    delete,
    path = "/book_copies/{id}",
    tag = "book_copies",
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Book copy ID")),
    responses(
        (status = 204, description = "Book copy deleted"),
        (status = 401, description = "Missing, unknown or non-admin API key"),
        (status = 404, description = "Book copy not found")
    )
)]
pub async fn delete_book_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    principal.require_admin()?;

    state.services.book_copies.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Borrow a book copy on behalf of `user_id`
#[utoipa::path(
    put,
    path = "/book_copies/{id}/borrow",
    tag = "book_copies",
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Book copy ID")),
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Book copy borrowed", body = BookCopyResponse),
        (status = 401, description = "Missing or unknown API key"),
        (status = 404, description = "Book copy not found"),
        (status = 422, description = "Missing user_id or copy already borrowed")
    )
)]
pub async fn borrow_book_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_principal): AuthenticatedUser,
    Path(id): Path<i32>,
    body: Result<Json<BorrowRequest>, JsonRejection>,
) -> AppResult<Json<BookCopyResponse>> {
    let request = borrow_request(body)?;

    let copy = state.services.book_copies.borrow(id, request.user_id).await?;
    Ok(Json(BookCopyResponse::from(&copy)))
}

/// Return a borrowed book copy
#[utoipa::path(
    put,
    path = "/book_copies/{id}/return_book",
    tag = "book_copies",
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Book copy ID")),
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Book copy returned", body = BookCopyResponse),
        (status = 401, description = "Missing or unknown API key"),
        (status = 403, description = "Copy is borrowed by another user"),
        (status = 404, description = "Book copy not found"),
        (status = 422, description = "Copy not borrowed, or admin request without user_id")
    )
)]
pub async fn return_book_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
    body: Result<Json<BorrowRequest>, JsonRejection>,
) -> AppResult<Json<BookCopyResponse>> {
    let request = borrow_request(body)?;

    let copy = state
        .services
        .book_copies
        .return_book(&principal, id, request.user_id)
        .await?;
    Ok(Json(BookCopyResponse::from(&copy)))
}
