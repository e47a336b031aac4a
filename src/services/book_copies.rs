//! Book copies service: CRUD plus the borrow/return state transitions

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book_copy::{BookCopy, BookCopyChanges, BookFormat, BorrowStatus, CreateBookCopy, NewBookCopy, UpdateBookCopy},
        user::Principal,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BookCopiesService {
    repository: Repository,
}

/// Reject an explicit null for a required attribute
fn required<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::Validation(format!("{} can't be blank", field)))
}

fn present_isbn(isbn: String) -> AppResult<String> {
    let isbn = isbn.trim().to_string();
    if isbn.is_empty() {
        return Err(AppError::Validation("isbn can't be blank".to_string()));
    }
    Ok(isbn)
}

impl BookCopiesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<BookCopy>> {
        self.repository.book_copies.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<BookCopy> {
        self.repository.book_copies.get_by_id(id).await
    }

    /// Verify a referenced book exists, reporting a missing one as invalid input
    async fn ensure_book(&self, book_id: i32) -> AppResult<()> {
        match self.repository.books.get_by_id(book_id).await {
            Ok(_) => Ok(()),
            Err(AppError::NotFound(_)) => Err(AppError::Validation("book must exist".to_string())),
            Err(e) => Err(e),
        }
    }

    pub async fn create(&self, data: CreateBookCopy) -> AppResult<BookCopy> {
        data.validate()?;

        let new_copy = NewBookCopy {
            isbn: present_isbn(required(data.isbn, "isbn")?)?,
            published: required(data.published, "published")?,
            format: required(data.format, "format")?.parse()?,
            book_id: required(data.book_id, "book_id")?,
        };
        self.ensure_book(new_copy.book_id).await?;

        let copy = self.repository.book_copies.create(&new_copy).await?;
        tracing::info!(book_copy_id = copy.id, book_id = copy.book_id, "Book copy created");
        Ok(copy)
    }

    pub async fn update(&self, id: i32, data: UpdateBookCopy) -> AppResult<BookCopy> {
        let changes = BookCopyChanges {
            isbn: data.isbn.map(|v| required(v, "isbn").and_then(present_isbn)).transpose()?,
            published: data.published.map(|v| required(v, "published")).transpose()?,
            format: data
                .format
                .map(|v| required(v, "format").and_then(|f| f.parse::<BookFormat>()))
                .transpose()?,
            book_id: data.book_id.map(|v| required(v, "book_id")).transpose()?,
        };

        if changes.is_empty() {
            return self.repository.book_copies.get_by_id(id).await;
        }
        if let Some(book_id) = changes.book_id {
            self.ensure_book(book_id).await?;
        }

        let copy = self.repository.book_copies.update(id, &changes).await?;
        tracing::info!(book_copy_id = copy.id, "Book copy updated");
        Ok(copy)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.book_copies.delete(id).await?;
        tracing::info!(book_copy_id = id, "Book copy deleted");
        Ok(())
    }

    /// Lend an available copy to `user_id`. Same rules for every principal.
    pub async fn borrow(&self, id: i32, user_id: Option<i32>) -> AppResult<BookCopy> {
        let user_id = user_id.ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;

        match self.repository.users.get_by_id(user_id).await {
            Ok(_) => {}
            Err(AppError::NotFound(_)) => {
                return Err(AppError::Validation(format!("User {} does not exist", user_id)));
            }
            Err(e) => return Err(e),
        }

        match self.repository.book_copies.borrow(id, user_id).await? {
            Some(copy) => {
                tracing::info!(book_copy_id = id, user_id, "Book copy borrowed");
                Ok(copy)
            }
            None => Err(AppError::BusinessRule("Book copy is already borrowed".to_string())),
        }
    }

    /// Make a borrowed copy available again.
    ///
    /// Admins must name a `user_id` but may return on behalf of anyone; a
    /// regular user may only return a copy they borrowed themselves.
    pub async fn return_book(&self, principal: &Principal, id: i32, user_id: Option<i32>) -> AppResult<BookCopy> {
        let expected_borrower = if principal.is_admin() {
            user_id.ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
            None
        } else {
            Some(principal.user_id)
        };

        if let Some(copy) = self.repository.book_copies.release(id, expected_borrower).await? {
            tracing::info!(
                book_copy_id = id,
                returned_by = principal.user_id,
                "Book copy returned"
            );
            return Ok(copy);
        }

        let copy = self.repository.book_copies.get_by_id(id).await?;
        match copy.status {
            BorrowStatus::Available => Err(AppError::BusinessRule("Book copy is not borrowed".to_string())),
            BorrowStatus::Borrowed(_) => Err(AppError::Authorization(
                "Book copy was borrowed by another user".to_string(),
            )),
        }
    }
}
