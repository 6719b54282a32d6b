//! Error types for the storage layer.

use catalog_core::{AuthorId, BookId};
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database driver or connection error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Author not found.
    #[error("author not found: {0}")]
    AuthorNotFound(AuthorId),

    /// Book not found.
    #[error("book not found: {0}")]
    BookNotFound(BookId),

    /// Another author already owns this email.
    #[error("email already in use: {0}")]
    DuplicateEmail(String),

    /// The author still has books referencing it.
    #[error("author {0} still has books")]
    AuthorHasBooks(AuthorId),

    /// A book references an author that does not exist.
    #[error("author {0} does not exist")]
    UnknownAuthor(AuthorId),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Maps a failed author write, turning the email index violation into
    /// `DuplicateEmail`.
    pub(crate) fn from_author_write(err: sqlx::Error, email: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::DuplicateEmail(email.to_string())
            }
            _ => Self::Database(err),
        }
    }

    /// Maps a failed book write, turning the author foreign key violation
    /// into `UnknownAuthor`.
    pub(crate) fn from_book_write(err: sqlx::Error, author_id: AuthorId) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                Self::UnknownAuthor(author_id)
            }
            _ => Self::Database(err),
        }
    }

    /// Maps a failed author delete, turning the restrict violation into
    /// `AuthorHasBooks`.
    pub(crate) fn from_author_delete(err: sqlx::Error, id: AuthorId) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                Self::AuthorHasBooks(id)
            }
            _ => Self::Database(err),
        }
    }
}
