//! The persistence contract shared by every backend.
//!
//! Reads return eagerly joined views: every author carries its books and
//! every book carries its author. Each mutating call is one atomic unit;
//! either all of its writes commit or none do.

use std::sync::Arc;

use async_trait::async_trait;
use catalog_core::{
    Author, AuthorFilter, AuthorId, AuthorWithBooks, Book, BookFilter, BookId, BookWithAuthor,
    NewAuthor, NewBook,
};

use crate::error::StoreResult;
use crate::memory::MemoryCatalogStore;
use crate::store::{PgCatalogStore, StoreBackend, StoreConfig};

/// Create/read/update/delete and filtered search over authors and books.
///
/// Implementations enforce the store-level constraints themselves:
/// `insert_author`/`update_author` fail with `DuplicateEmail`,
/// `insert_book`/`update_book` fail with `UnknownAuthor` and `delete_author`
/// fails with `AuthorHasBooks`, regardless of any check done by the caller
/// beforehand.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Checks that the backing store is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// All authors with their books, by ascending id.
    async fn list_authors(&self) -> StoreResult<Vec<AuthorWithBooks>> {
        self.search_authors(&AuthorFilter::default()).await
    }

    /// One author with its books, or `AuthorNotFound`.
    async fn get_author(&self, id: AuthorId) -> StoreResult<AuthorWithBooks>;

    async fn author_exists(&self, id: AuthorId) -> StoreResult<bool>;

    /// The author owning `email` after normalisation, if any.
    async fn find_author_by_email(&self, email: &str) -> StoreResult<Option<Author>>;

    /// Authors matching every provided filter.
    async fn search_authors(&self, filter: &AuthorFilter) -> StoreResult<Vec<AuthorWithBooks>>;

    /// Persists a new author and returns it with its assigned id.
    async fn insert_author(&self, author: &NewAuthor) -> StoreResult<Author>;

    /// Overwrites name and email of an existing author.
    async fn update_author(&self, id: AuthorId, author: &NewAuthor) -> StoreResult<Author>;

    /// Removes an author that has no books.
    async fn delete_author(&self, id: AuthorId) -> StoreResult<()>;

    /// All books with their author, by ascending id.
    async fn list_books(&self) -> StoreResult<Vec<BookWithAuthor>> {
        self.search_books(&BookFilter::default()).await
    }

    /// One book with its author, or `BookNotFound`.
    async fn get_book(&self, id: BookId) -> StoreResult<BookWithAuthor>;

    /// Books matching every provided filter.
    async fn search_books(&self, filter: &BookFilter) -> StoreResult<Vec<BookWithAuthor>>;

    /// Persists a new book and re-reads it with its author in the same unit.
    async fn insert_book(&self, book: &NewBook) -> StoreResult<BookWithAuthor>;

    /// Overwrites every field of an existing book.
    async fn update_book(&self, id: BookId, book: &NewBook) -> StoreResult<Book>;

    async fn delete_book(&self, id: BookId) -> StoreResult<()>;
}

/// Opens the repository selected by `config.backend`.
///
/// The PostgreSQL backend connects its pool and runs migrations when
/// enabled; the memory backend starts with the sample data.
pub async fn open(config: &StoreConfig) -> StoreResult<Arc<dyn CatalogRepository>> {
    match config.backend {
        StoreBackend::Postgres => {
            let store = PgCatalogStore::connect(config).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory catalog store; data is lost on shutdown");
            Ok(Arc::new(MemoryCatalogStore::seeded()))
        }
    }
}
