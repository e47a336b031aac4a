//! API handlers for the book lending REST endpoints

pub mod authors;
pub mod book_copies;
pub mod books;
pub mod health;
pub mod openapi;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::Principal, AppState};

/// Extract the API key from an `Authorization` header value.
///
/// Accepts `Token token=<key>`, `Token token="<key>"` (optionally followed by
/// further comma separated params), `Token <key>` and `Bearer <key>`.
pub fn parse_api_key(header: &str) -> Option<&str> {
    let (scheme, credentials) = header.trim().split_once(char::is_whitespace)?;
    let credentials = credentials.trim();

    let key = if scheme.eq_ignore_ascii_case("token") {
        let first = credentials.split(',').next().unwrap_or_default().trim();
        let value = first.strip_prefix("token=").unwrap_or(first);
        value.trim_matches('"')
    } else if scheme.eq_ignore_ascii_case("bearer") {
        credentials
    } else {
        return None;
    };

    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Extractor for the principal behind the request's API key
pub struct AuthenticatedUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let api_key = parse_api_key(auth_header)
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let principal = state.services.users.authenticate(api_key).await?;
        Ok(AuthenticatedUser(principal))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Book copies
        .route(
            "/book_copies",
            get(book_copies::list_book_copies).post(book_copies::create_book_copy),
        )
        .route(
            "/book_copies/:id",
            get(book_copies::get_book_copy)
                .put(book_copies::update_book_copy)
                .patch(book_copies::update_book_copy)
                .delete(book_copies::delete_book_copy),
        )
        .route("/book_copies/:id/borrow", put(book_copies::borrow_book_copy))
        .route("/book_copies/:id/return_book", put(book_copies::return_book_copy))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book).put(books::update_book).delete(books::delete_book),
        )
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/me", get(users::me))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
