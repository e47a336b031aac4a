//! Book copy (loanable instance of a book) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Physical format of a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookFormat {
    Hardback,
    Paperback,
    Ebook,
}

impl BookFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookFormat::Hardback => "hardback",
            BookFormat::Paperback => "paperback",
            BookFormat::Ebook => "ebook",
        }
    }
}

impl std::fmt::Display for BookFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hardback" => Ok(BookFormat::Hardback),
            "paperback" => Ok(BookFormat::Paperback),
            "ebook" => Ok(BookFormat::Ebook),
            _ => Err(AppError::Validation(format!("format '{}' is not included in the list", s))),
        }
    }
}

/// Who, if anyone, currently holds a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorrowStatus {
    #[default]
    Available,
    Borrowed(i32),
}

impl BorrowStatus {
    pub fn borrower(&self) -> Option<i32> {
        match self {
            BorrowStatus::Available => None,
            BorrowStatus::Borrowed(user_id) => Some(*user_id),
        }
    }

    pub fn is_borrowed(&self) -> bool {
        matches!(self, BorrowStatus::Borrowed(_))
    }
}

impl From<Option<i32>> for BorrowStatus {
    fn from(user_id: Option<i32>) -> Self {
        user_id.map(BorrowStatus::Borrowed).unwrap_or_default()
    }
}

/// Internal row structure for database queries
#[derive(Debug, Clone, FromRow)]
pub struct BookCopyRow {
    id: i32,
    isbn: String,
    published: NaiveDate,
    format: String,
    book_id: i32,
    user_id: Option<i32>,
}

impl TryFrom<BookCopyRow> for BookCopy {
    type Error = AppError;

    fn try_from(row: BookCopyRow) -> Result<Self, Self::Error> {
        let format = row
            .format
            .parse()
            .map_err(|_| AppError::Internal(format!("Book copy {} has unknown format '{}'", row.id, row.format)))?;
        Ok(BookCopy {
            id: row.id,
            isbn: row.isbn,
            published: row.published,
            format,
            book_id: row.book_id,
            status: row.user_id.into(),
        })
    }
}

/// Stored book copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookCopy {
    pub id: i32,
    pub isbn: String,
    pub published: NaiveDate,
    pub format: BookFormat,
    pub book_id: i32,
    pub status: BorrowStatus,
}

/// Public JSON shape of a book copy. Field order is part of the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookCopySerializer {
    pub id: i32,
    pub isbn: String,
    /// Publication date (YYYY-MM-DD)
    pub published: NaiveDate,
    pub format: BookFormat,
    pub book_id: i32,
    /// Borrowing user, null when the copy is available
    pub user_id: Option<i32>,
}

impl From<&BookCopy> for BookCopySerializer {
    fn from(copy: &BookCopy) -> Self {
        Self {
            id: copy.id,
            isbn: copy.isbn.clone(),
            published: copy.published,
            format: copy.format,
            book_id: copy.book_id,
            user_id: copy.status.borrower(),
        }
    }
}

/// `{ "book_copy": ... }`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookCopyResponse {
    pub book_copy: BookCopySerializer,
}

impl From<&BookCopy> for BookCopyResponse {
    fn from(copy: &BookCopy) -> Self {
        Self { book_copy: copy.into() }
    }
}

/// `{ "book_copies": [...] }`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookCopyListResponse {
    pub book_copies: Vec<BookCopySerializer>,
}

/// Create book copy request body
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateBookCopyRequest {
    #[serde(default)]
    pub book_copy: CreateBookCopy,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateBookCopy {
    #[validate(
        required(message = "isbn can't be blank"),
        length(min = 1, message = "isbn can't be blank")
    )]
    pub isbn: Option<String>,
    #[validate(required(message = "published can't be blank"))]
    pub published: Option<NaiveDate>,
    #[validate(required(message = "book must exist"))]
    pub book_id: Option<i32>,
    /// hardback, paperback or ebook
    #[validate(required(message = "format can't be blank"))]
    pub format: Option<String>,
}

/// Validated copy ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookCopy {
    pub isbn: String,
    pub published: NaiveDate,
    pub format: BookFormat,
    pub book_id: i32,
}

/// Update book copy request body
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBookCopyRequest {
    #[serde(default)]
    pub book_copy: UpdateBookCopy,
}

/// Partial update. An absent field is left alone, an explicit null is rejected.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBookCopy {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub isbn: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub published: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub book_id: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub format: Option<Option<String>>,
}

/// Validated field changes for an existing copy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookCopyChanges {
    pub isbn: Option<String>,
    pub published: Option<NaiveDate>,
    pub format: Option<BookFormat>,
    pub book_id: Option<i32>,
}

impl BookCopyChanges {
    pub fn is_empty(&self) -> bool {
        self.isbn.is_none() && self.published.is_none() && self.format.is_none() && self.book_id.is_none()
    }
}

/// Body of `borrow` and `return_book`
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BorrowRequest {
    pub user_id: Option<i32>,
}
