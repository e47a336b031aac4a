//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, book_copies, books, health, users};

/// Registers the `Authorization: Token token=<key>` scheme
struct ApiKeyScheme;

impl Modify for ApiKeyScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "Token token=<api_key>",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Book Lending API",
        version = "1.0.0",
        description = "Book copies, borrowing and returns"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Book copies
        book_copies::list_book_copies,
        book_copies::get_book_copy,
        book_copies::create_book_copy,
        book_copies::update_book_copy,
        book_copies::delete_book_copy,
        book_copies::borrow_book_copy,
        book_copies::return_book_copy,
        // Catalog
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Users
        users::list_users,
        users::create_user,
        users::me,
    ),
    components(
        schemas(
            // Book copies
            crate::models::book_copy::BookFormat,
            crate::models::book_copy::BookCopySerializer,
            crate::models::book_copy::BookCopyResponse,
            crate::models::book_copy::BookCopyListResponse,
            crate::models::book_copy::CreateBookCopyRequest,
            crate::models::book_copy::CreateBookCopy,
            crate::models::book_copy::UpdateBookCopyRequest,
            crate::models::book_copy::UpdateBookCopy,
            crate::models::book_copy::BorrowRequest,
            // Catalog
            crate::models::author::Author,
            crate::models::author::AuthorResponse,
            crate::models::author::AuthorListResponse,
            crate::models::author::CreateAuthorRequest,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthorRequest,
            crate::models::author::UpdateAuthor,
            crate::models::book::Book,
            crate::models::book::BookResponse,
            crate::models::book::BookListResponse,
            crate::models::book::CreateBookRequest,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBookRequest,
            crate::models::book::UpdateBook,
            // Users
            crate::models::user::Role,
            crate::models::user::User,
            crate::models::user::UserResponse,
            crate::models::user::UserListResponse,
            crate::models::user::CreatedUserResponse,
            crate::models::user::CreateUserRequest,
            crate::models::user::CreateUser,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&ApiKeyScheme),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "book_copies", description = "Book copies, borrowing and returns"),
        (name = "catalog", description = "Authors and books"),
        (name = "users", description = "User management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
