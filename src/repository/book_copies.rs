//! Book copies storage

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book_copy::{BookCopy, BookCopyChanges, BookCopyRow, NewBookCopy},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookCopiesRepository: Send + Sync {
    /// All copies ordered by id
    async fn list(&self) -> AppResult<Vec<BookCopy>>;

    async fn get_by_id(&self, id: i32) -> AppResult<BookCopy>;

    async fn create(&self, data: &NewBookCopy) -> AppResult<BookCopy>;

    async fn update(&self, id: i32, changes: &BookCopyChanges) -> AppResult<BookCopy>;

    async fn delete(&self, id: i32) -> AppResult<()>;

    async fn count_for_book(&self, book_id: i32) -> AppResult<i64>;

    /// Set the borrower only if the copy is available.
    /// `Ok(None)` means the copy exists but is already borrowed.
    async fn borrow(&self, id: i32, user_id: i32) -> AppResult<Option<BookCopy>>;

    /// Clear the borrower if the copy is borrowed, and, when `borrower` is
    /// given, only if it is borrowed by that user.
    /// `Ok(None)` means the copy exists but nothing was cleared.
    async fn release(&self, id: i32, borrower: Option<i32>) -> AppResult<Option<BookCopy>>;
}

const COLUMNS: &str = "id, isbn, published, format, book_id, user_id";

#[derive(Clone)]
pub struct PgBookCopiesRepository {
    pool: Pool<Postgres>,
}

impl PgBookCopiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Distinguish "missing" from "guard not met" after a conditional update
    async fn ensure_exists(&self, id: i32) -> AppResult<()> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM book_copies WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if exists {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Book copy {} not found", id))
}

#[async_trait]
impl BookCopiesRepository for PgBookCopiesRepository {
    async fn list(&self) -> AppResult<Vec<BookCopy>> {
        let rows = sqlx::query_as::<_, BookCopyRow>(&format!("SELECT {} FROM book_copies ORDER BY id", COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(BookCopy::try_from).collect()
    }

    async fn get_by_id(&self, id: i32) -> AppResult<BookCopy> {
        sqlx::query_as::<_, BookCopyRow>(&format!("SELECT {} FROM book_copies WHERE id = $1", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))?
            .try_into()
    }

    async fn create(&self, data: &NewBookCopy) -> AppResult<BookCopy> {
        sqlx::query_as::<_, BookCopyRow>(&format!(
            r#"
            INSERT INTO book_copies (isbn, published, format, book_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(&data.isbn)
        .bind(data.published)
        .bind(data.format.as_str())
        .bind(data.book_id)
        .fetch_one(&self.pool)
        .await?
        .try_into()
    }

    async fn update(&self, id: i32, changes: &BookCopyChanges) -> AppResult<BookCopy> {
        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(changes.isbn, "isbn");
        add_field!(changes.published, "published");
        add_field!(changes.format, "format");
        add_field!(changes.book_id, "book_id");

        let query = format!(
            "UPDATE book_copies SET {} WHERE id = $1 RETURNING {}",
            sets.join(", "),
            COLUMNS
        );

        let mut builder = sqlx::query_as::<_, BookCopyRow>(&query).bind(id);

        if let Some(ref isbn) = changes.isbn {
            builder = builder.bind(isbn);
        }
        if let Some(published) = changes.published {
            builder = builder.bind(published);
        }
        if let Some(format) = changes.format {
            builder = builder.bind(format.as_str());
        }
        if let Some(book_id) = changes.book_id {
            builder = builder.bind(book_id);
        }

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))?
            .try_into()
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_copies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn count_for_book(&self, book_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_copies WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn borrow(&self, id: i32, user_id: i32) -> AppResult<Option<BookCopy>> {
        let row = sqlx::query_as::<_, BookCopyRow>(&format!(
            r#"
            UPDATE book_copies SET user_id = $2, updated_at = NOW()
            WHERE id = $1 AND user_id IS NULL
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row.try_into()?)),
            None => {
                self.ensure_exists(id).await?;
                Ok(None)
            }
        }
    }

    async fn release(&self, id: i32, borrower: Option<i32>) -> AppResult<Option<BookCopy>> {
        let row = sqlx::query_as::<_, BookCopyRow>(&format!(
            r#"
            UPDATE book_copies SET user_id = NULL, updated_at = NOW()
            WHERE id = $1
              AND user_id IS NOT NULL
              AND ($2::INTEGER IS NULL OR user_id = $2)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(id)
        .bind(borrower)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row.try_into()?)),
            None => {
                self.ensure_exists(id).await?;
                Ok(None)
            }
        }
    }
}
