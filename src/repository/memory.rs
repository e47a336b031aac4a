//! In-process storage backend
//!
//! All tables sit behind one lock, so every conditional update (borrow,
//! release, guarded deletes) is a single critical section.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{AuthorsRepository, BookCopiesRepository, BooksRepository, UsersRepository};
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorChanges, NewAuthor},
        book::{Book, BookChanges, NewBook},
        book_copy::{BookCopy, BookCopyChanges, BorrowStatus, NewBookCopy},
        user::{NewUser, Role, User},
    },
};

#[derive(Default)]
struct Tables {
    last_id: i32,
    authors: BTreeMap<i32, Author>,
    books: BTreeMap<i32, Book>,
    book_copies: BTreeMap<i32, BookCopy>,
    users: BTreeMap<i32, User>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn copy_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Book copy {} not found", id))
}

fn book_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Book {} not found", id))
}

fn author_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Author {} not found", id))
}

#[async_trait]
impl AuthorsRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Author>> {
        Ok(self.tables.read().await.authors.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        self.tables
            .read()
            .await
            .authors
            .get(&id)
            .cloned()
            .ok_or_else(|| author_not_found(id))
    }

    async fn create(&self, data: &NewAuthor) -> AppResult<Author> {
        let mut tables = self.tables.write().await;
        let author = Author {
            id: tables.next_id(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
        };
        tables.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn update(&self, id: i32, changes: &AuthorChanges) -> AppResult<Author> {
        let mut tables = self.tables.write().await;
        let author = tables.authors.get_mut(&id).ok_or_else(|| author_not_found(id))?;
        if let Some(ref first_name) = changes.first_name {
            author.first_name = first_name.clone();
        }
        if let Some(ref last_name) = changes.last_name {
            author.last_name = last_name.clone();
        }
        Ok(author.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.books.values().any(|b| b.author_id == id) {
            return Err(AppError::Validation("Cannot delete an author who still has books".to_string()));
        }
        tables.authors.remove(&id).map(|_| ()).ok_or_else(|| author_not_found(id))
    }
}

#[async_trait]
impl BooksRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Book>> {
        Ok(self.tables.read().await.books.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.tables
            .read()
            .await
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| book_not_found(id))
    }

    async fn create(&self, data: &NewBook) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        if !tables.authors.contains_key(&data.author_id) {
            return Err(AppError::Validation("author must exist".to_string()));
        }
        let book = Book {
            id: tables.next_id(),
            title: data.title.clone(),
            author_id: data.author_id,
        };
        tables.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update(&self, id: i32, changes: &BookChanges) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        if let Some(author_id) = changes.author_id {
            if !tables.authors.contains_key(&author_id) {
                return Err(AppError::Validation("author must exist".to_string()));
            }
        }
        let book = tables.books.get_mut(&id).ok_or_else(|| book_not_found(id))?;
        if let Some(ref title) = changes.title {
            book.title = title.clone();
        }
        if let Some(author_id) = changes.author_id {
            book.author_id = author_id;
        }
        Ok(book.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.book_copies.values().any(|c| c.book_id == id) {
            return Err(AppError::Validation("Cannot delete a book that still has copies".to_string()));
        }
        tables.books.remove(&id).map(|_| ()).ok_or_else(|| book_not_found(id))
    }

    async fn count_for_author(&self, author_id: i32) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.books.values().filter(|b| b.author_id == author_id).count() as i64)
    }
}

#[async_trait]
impl BookCopiesRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<BookCopy>> {
        Ok(self.tables.read().await.book_copies.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<BookCopy> {
        self.tables
            .read()
            .await
            .book_copies
            .get(&id)
            .cloned()
            .ok_or_else(|| copy_not_found(id))
    }

    async fn create(&self, data: &NewBookCopy) -> AppResult<BookCopy> {
        let mut tables = self.tables.write().await;
        if !tables.books.contains_key(&data.book_id) {
            return Err(AppError::Validation("book must exist".to_string()));
        }
        let copy = BookCopy {
            id: tables.next_id(),
            isbn: data.isbn.clone(),
            published: data.published,
            format: data.format,
            book_id: data.book_id,
            status: BorrowStatus::Available,
        };
        tables.book_copies.insert(copy.id, copy.clone());
        Ok(copy)
    }

    async fn update(&self, id: i32, changes: &BookCopyChanges) -> AppResult<BookCopy> {
        let mut tables = self.tables.write().await;
        if let Some(book_id) = changes.book_id {
            if !tables.books.contains_key(&book_id) {
                return Err(AppError::Validation("book must exist".to_string()));
            }
        }
        let copy = tables.book_copies.get_mut(&id).ok_or_else(|| copy_not_found(id))?;
        if let Some(ref isbn) = changes.isbn {
            copy.isbn = isbn.clone();
        }
        if let Some(published) = changes.published {
            copy.published = published;
        }
        if let Some(format) = changes.format {
            copy.format = format;
        }
        if let Some(book_id) = changes.book_id {
            copy.book_id = book_id;
        }
        Ok(copy.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        self.tables
            .write()
            .await
            .book_copies
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| copy_not_found(id))
    }

    async fn count_for_book(&self, book_id: i32) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.book_copies.values().filter(|c| c.book_id == book_id).count() as i64)
    }

    async fn borrow(&self, id: i32, user_id: i32) -> AppResult<Option<BookCopy>> {
        let mut tables = self.tables.write().await;
        let copy = tables.book_copies.get_mut(&id).ok_or_else(|| copy_not_found(id))?;
        if copy.status.is_borrowed() {
            return Ok(None);
        }
        copy.status = BorrowStatus::Borrowed(user_id);
        Ok(Some(copy.clone()))
    }

    async fn release(&self, id: i32, borrower: Option<i32>) -> AppResult<Option<BookCopy>> {
        let mut tables = self.tables.write().await;
        let copy = tables.book_copies.get_mut(&id).ok_or_else(|| copy_not_found(id))?;
        let releasable = match (copy.status, borrower) {
            (BorrowStatus::Available, _) => false,
            (BorrowStatus::Borrowed(_), None) => true,
            (BorrowStatus::Borrowed(current), Some(expected)) => current == expected,
        };
        if !releasable {
            return Ok(None);
        }
        copy.status = BorrowStatus::Available;
        Ok(Some(copy.clone()))
    }
}

#[async_trait]
impl UsersRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.tables
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    async fn get_by_api_key_digest(&self, digest: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.api_key_digest == digest).cloned())
    }

    async fn create(&self, data: &NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email.eq_ignore_ascii_case(&data.email)) {
            return Err(AppError::Validation("email has already been taken".to_string()));
        }
        let user = User {
            id: tables.next_id(),
            email: data.email.clone(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            role: data.role,
            api_key_digest: data.api_key_digest.clone(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn count_with_role(&self, role: Role) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().filter(|u| u.role == role).count() as i64)
    }
}
