//! User management endpoints

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUserRequest, CreatedUserResponse, UserListResponse, UserResponse},
};

use super::AuthenticatedUser;

/// List users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("api_key" = [])),
    responses(
        (status = 200, description = "All users", body = UserListResponse),
        (status = 401, description = "Missing, unknown or non-admin API key")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<UserListResponse>> {
    principal.require_admin()?;
    let users = state.services.users.list_users().await?;
    Ok(Json(UserListResponse { users }))
}

/// Create a user or admin and hand out its API key
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("api_key" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created; the API key is only shown here", body = CreatedUserResponse),
        (status = 401, description = "Missing, unknown or non-admin API key"),
        (status = 422, description = "Invalid or duplicate email")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateUserRequest>, AppError>,
) -> AppResult<(StatusCode, Json<CreatedUserResponse>)> {
    principal.require_admin()?;
    let (user, api_key) = state.services.users.create_user(request.user).await?;
    Ok((StatusCode::CREATED, Json(CreatedUserResponse { user, api_key })))
}

/// Get the authenticated user
#[utoipa::path(
    get,
    path = "/me",
    tag = "users",
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or unknown API key")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users.get_by_id(principal.user_id).await?;
    Ok(Json(UserResponse { user }))
}
