//! Catalog management service (authors and books)

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorChanges, CreateAuthor, NewAuthor, UpdateAuthor},
        book::{Book, BookChanges, CreateBook, NewBook, UpdateBook},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

/// Required text attribute: present, not null, not blank
fn present(value: Option<String>, field: &str) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{} can't be blank", field)))
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create_author(&self, data: CreateAuthor) -> AppResult<Author> {
        data.validate()?;
        let author = NewAuthor {
            first_name: present(data.first_name, "first_name")?,
            last_name: present(data.last_name, "last_name")?,
        };
        let author = self.repository.authors.create(&author).await?;
        tracing::info!(author_id = author.id, "Author created");
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, data: UpdateAuthor) -> AppResult<Author> {
        let changes = AuthorChanges {
            first_name: data.first_name.map(|v| present(v, "first_name")).transpose()?,
            last_name: data.last_name.map(|v| present(v, "last_name")).transpose()?,
        };
        self.repository.authors.update(id, &changes).await
    }

    /// Delete an author; refused while the author still owns books
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.get_by_id(id).await?;
        if self.repository.books.count_for_author(id).await? > 0 {
            return Err(AppError::Validation("Cannot delete an author who still has books".to_string()));
        }
        self.repository.authors.delete(id).await?;
        tracing::info!(author_id = id, "Author deleted");
        Ok(())
    }

    /// Verify a referenced author exists, reporting a missing one as invalid input
    async fn ensure_author(&self, author_id: i32) -> AppResult<()> {
        match self.repository.authors.get_by_id(author_id).await {
            Ok(_) => Ok(()),
            Err(AppError::NotFound(_)) => Err(AppError::Validation("author must exist".to_string())),
            Err(e) => Err(e),
        }
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn create_book(&self, data: CreateBook) -> AppResult<Book> {
        data.validate()?;
        let book = NewBook {
            title: present(data.title, "title")?,
            author_id: data
                .author_id
                .ok_or_else(|| AppError::Validation("author must exist".to_string()))?,
        };
        self.ensure_author(book.author_id).await?;

        let book = self.repository.books.create(&book).await?;
        tracing::info!(book_id = book.id, author_id = book.author_id, "Book created");
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, data: UpdateBook) -> AppResult<Book> {
        let changes = BookChanges {
            title: data.title.map(|v| present(v, "title")).transpose()?,
            author_id: data
                .author_id
                .map(|v| v.ok_or_else(|| AppError::Validation("author must exist".to_string())))
                .transpose()?,
        };
        if let Some(author_id) = changes.author_id {
            self.ensure_author(author_id).await?;
        }
        self.repository.books.update(id, &changes).await
    }

    /// Delete a book; refused while copies of it exist
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.get_by_id(id).await?;
        if self.repository.book_copies.count_for_book(id).await? > 0 {
            return Err(AppError::Validation("Cannot delete a book that still has copies".to_string()));
        }
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }
}
