//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Catalog entry; the loanable units are its book copies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    pub book: Book,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookListResponse {
    pub books: Vec<Book>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateBookRequest {
    #[serde(default)]
    pub book: CreateBook,
}

/// Create book request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(
        required(message = "title can't be blank"),
        length(min = 1, message = "title can't be blank")
    )]
    pub title: Option<String>,
    #[validate(required(message = "author must exist"))]
    pub author_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author_id: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBookRequest {
    #[serde(default)]
    pub book: UpdateBook,
}

/// Update book request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBook {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub title: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub author_id: Option<Option<i32>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author_id: Option<i32>,
}
