//! Author model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Author record. An author owns many books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

/// `{ "author": ... }`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthorResponse {
    pub author: Author,
}

/// `{ "authors": [...] }`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthorListResponse {
    pub authors: Vec<Author>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateAuthorRequest {
    #[serde(default)]
    pub author: CreateAuthor,
}

/// Create author request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(
        required(message = "first_name can't be blank"),
        length(min = 1, message = "first_name can't be blank")
    )]
    pub first_name: Option<String>,
    #[validate(
        required(message = "last_name can't be blank"),
        length(min = 1, message = "last_name can't be blank")
    )]
    pub last_name: Option<String>,
}

/// Validated author ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateAuthorRequest {
    #[serde(default)]
    pub author: UpdateAuthor,
}

/// Update author request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateAuthor {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub first_name: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub last_name: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
