//! Repository layer for storage operations
//!
//! Each domain has a storage trait with a PostgreSQL implementation living
//! next to it; [`memory::MemoryStore`] implements every trait over
//! process-local tables.

pub mod authors;
pub mod book_copies;
pub mod books;
pub mod memory;
pub mod users;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

use crate::error::AppResult;

pub use authors::AuthorsRepository;
pub use book_copies::BookCopiesRepository;
pub use books::BooksRepository;
pub use users::UsersRepository;

/// Main repository struct holding one handle per domain
#[derive(Clone)]
pub struct Repository {
    pub pool: Option<Pool<Postgres>>,
    pub authors: Arc<dyn AuthorsRepository>,
    pub books: Arc<dyn BooksRepository>,
    pub book_copies: Arc<dyn BookCopiesRepository>,
    pub users: Arc<dyn UsersRepository>,
}

impl Repository {
    /// Create a repository backed by the given database pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            authors: Arc::new(authors::PgAuthorsRepository::new(pool.clone())),
            books: Arc::new(books::PgBooksRepository::new(pool.clone())),
            book_copies: Arc::new(book_copies::PgBookCopiesRepository::new(pool.clone())),
            users: Arc::new(users::PgUsersRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Create a repository keeping everything in process memory
    pub fn in_memory() -> Self {
        let store = memory::MemoryStore::new();
        Self {
            authors: Arc::new(store.clone()),
            books: Arc::new(store.clone()),
            book_copies: Arc::new(store.clone()),
            users: Arc::new(store),
            pool: None,
        }
    }

    /// Check that storage is reachable
    pub async fn ping(&self) -> AppResult<()> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}
