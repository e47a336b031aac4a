//! Data models for the book lending server

pub mod author;
pub mod book;
pub mod book_copy;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use book_copy::{BookCopy, BookFormat, BorrowStatus};
pub use user::{Principal, Role, User};
