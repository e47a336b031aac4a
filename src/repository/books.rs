//! Books storage

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookChanges, NewBook},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksRepository: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Book>>;

    async fn get_by_id(&self, id: i32) -> AppResult<Book>;

    async fn create(&self, data: &NewBook) -> AppResult<Book>;

    async fn update(&self, id: i32, changes: &BookChanges) -> AppResult<Book>;

    async fn delete(&self, id: i32) -> AppResult<()>;

    async fn count_for_author(&self, author_id: i32) -> AppResult<i64>;
}

#[derive(Clone)]
pub struct PgBooksRepository {
    pool: Pool<Postgres>,
}

impl PgBooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BooksRepository for PgBooksRepository {
    async fn list(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>("SELECT id, title, author_id FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT id, title, author_id FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn create(&self, data: &NewBook) -> AppResult<Book> {
        let row = sqlx::query_as::<_, Book>(
            "INSERT INTO books (title, author_id) VALUES ($1, $2) RETURNING id, title, author_id",
        )
        .bind(&data.title)
        .bind(data.author_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: i32, changes: &BookChanges) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                author_id = COALESCE($3, author_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, author_id
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(changes.author_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }

    async fn count_for_author(&self, author_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
