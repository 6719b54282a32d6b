//! Consistency rules shared by the REST and GraphQL surfaces.
//!
//! Every write goes through [`CatalogService`], which validates the payload
//! and checks email uniqueness, the book-to-author reference and the author
//! delete-guard against current store state before the repository is asked
//! to mutate anything. The repository enforces the same constraints again,
//! so a concurrent writer that slips between check and write still gets the
//! same error kind.

use std::sync::Arc;

use catalog_core::{
    Author, AuthorFilter, AuthorId, AuthorWithBooks, Book, BookFilter, BookId, BookWithAuthor,
    NewAuthor, NewBook, ValidationError,
};
use catalog_store::{CatalogRepository, StoreError};
use serde::Deserialize;

/// Result type for service operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Outcome kinds every access surface maps to its own protocol.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Malformed or missing field, id mismatch, unknown author reference.
    #[error("{0}")]
    Validation(String),

    /// The addressed record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Email already taken, or delete blocked by dependent books.
    #[error("{0}")]
    Conflict(String),

    /// Store unreachable or failed unexpectedly. Never shown to callers.
    #[error("store failure: {0}")]
    Upstream(#[source] StoreError),
}

impl From<ValidationError> for CatalogError {
    fn from(err: ValidationError) -> Self {
        tracing::debug!(error = %err, "Payload rejected");
        Self::Validation(err.to_string())
    }
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AuthorNotFound(id) => Self::NotFound(author_not_found(id)),
            StoreError::BookNotFound(id) => Self::NotFound(book_not_found(id)),
            StoreError::DuplicateEmail(email) => {
                tracing::warn!(%email, "Email uniqueness enforced by store");
                Self::Conflict(email_taken(&email))
            }
            StoreError::AuthorHasBooks(id) => {
                tracing::warn!(author_id = %id, "Delete-guard enforced by store");
                Self::Conflict(author_has_books(id))
            }
            StoreError::UnknownAuthor(id) => {
                tracing::warn!(author_id = %id, "Author reference enforced by store");
                Self::Validation(unknown_author(id))
            }
            other => {
                tracing::error!(error = %other, error_debug = ?other, "Catalog store failure");
                Self::Upstream(other)
            }
        }
    }
}

fn author_not_found(id: AuthorId) -> String {
    format!("Author with id {} not found", id)
}

fn book_not_found(id: BookId) -> String {
    format!("Book with id {} not found", id)
}

fn email_taken(email: &str) -> String {
    format!("An author with email '{}' already exists", email)
}

fn author_has_books(id: AuthorId) -> String {
    format!("Author {} still has books and cannot be deleted", id)
}

fn unknown_author(id: AuthorId) -> String {
    format!("Author with id {} does not exist", id)
}

fn check_identity<T>(route: T, payload: Option<T>) -> CatalogResult<()>
where
    T: PartialEq + std::fmt::Display + Copy,
{
    match payload {
        Some(payload) if payload != route => {
            tracing::debug!(%route, %payload, "Identity mismatch");
            Err(CatalogError::Validation(format!(
                "Path id {} does not match payload id {}",
                route, payload
            )))
        }
        _ => Ok(()),
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// Author fields as submitted by a client.
///
/// Missing text fields deserialize as empty and are rejected by validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Book fields as submitted by a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub isbn: String,
    pub publication_year: i32,
    pub author_id: AuthorId,
}

impl AuthorInput {
    fn validate(&self) -> CatalogResult<NewAuthor> {
        Ok(NewAuthor::new(&self.name, &self.email)?)
    }
}

impl BookInput {
    fn validate(&self) -> CatalogResult<NewBook> {
        Ok(NewBook::new(
            &self.title,
            &self.isbn,
            self.publication_year,
            self.author_id,
        )?)
    }
}

// ============================================================================
// Service
// ============================================================================

/// The single rule set behind both access surfaces.
#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService").finish_non_exhaustive()
    }
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepository>) -> Self {
        Self { repo }
    }

    /// Checks that the store answers.
    pub async fn ping(&self) -> CatalogResult<()> {
        Ok(self.repo.ping().await?)
    }

    // ==================== Authors ====================

    pub async fn list_authors(&self) -> CatalogResult<Vec<AuthorWithBooks>> {
        Ok(self.repo.list_authors().await?)
    }

    /// One author with its books, or `NotFound`.
    pub async fn get_author(&self, id: AuthorId) -> CatalogResult<AuthorWithBooks> {
        Ok(self.repo.get_author(id).await?)
    }

    /// Like [`get_author`](Self::get_author) but absence is `None`.
    pub async fn find_author(&self, id: AuthorId) -> CatalogResult<Option<AuthorWithBooks>> {
        match self.repo.get_author(id).await {
            Ok(author) => Ok(Some(author)),
            Err(StoreError::AuthorNotFound(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Authors matching all given filters. Blank filters are ignored.
    pub async fn search_authors(&self, filter: AuthorFilter) -> CatalogResult<Vec<AuthorWithBooks>> {
        Ok(self.repo.search_authors(&filter.normalized()).await?)
    }

    /// Validates, checks email uniqueness and persists a new author.
    pub async fn create_author(&self, input: &AuthorInput) -> CatalogResult<Author> {
        let author = input.validate()?;

        if self.repo.find_author_by_email(&author.email).await?.is_some() {
            tracing::debug!(email = %author.email, "Create rejected: email taken");
            return Err(CatalogError::Conflict(email_taken(&author.email)));
        }

        let created = self.repo.insert_author(&author).await?;
        tracing::info!(author_id = %created.id, "Author created");
        Ok(created)
    }

    /// Overwrites name and email of an existing author.
    ///
    /// `payload_id`, when the caller's payload carries one, must equal `id`.
    /// The email may stay the author's own but must not belong to anyone else.
    pub async fn update_author(
        &self,
        id: AuthorId,
        payload_id: Option<AuthorId>,
        input: &AuthorInput,
    ) -> CatalogResult<Author> {
        check_identity(id, payload_id)?;
        let author = input.validate()?;

        if !self.repo.author_exists(id).await? {
            tracing::debug!(author_id = %id, "Update rejected: no such author");
            return Err(CatalogError::NotFound(author_not_found(id)));
        }

        if let Some(owner) = self.repo.find_author_by_email(&author.email).await? {
            if owner.id != id {
                tracing::debug!(author_id = %id, owner_id = %owner.id, "Update rejected: email taken");
                return Err(CatalogError::Conflict(email_taken(&author.email)));
            }
        }

        let updated = self.repo.update_author(id, &author).await?;
        tracing::info!(author_id = %id, "Author updated");
        Ok(updated)
    }

    /// Deletes an author that no book references.
    pub async fn delete_author(&self, id: AuthorId) -> CatalogResult<()> {
        let author = self.get_author(id).await?;

        if author.has_books() {
            tracing::debug!(
                author_id = %id,
                books = author.books.len(),
                "Delete rejected: author has books"
            );
            return Err(CatalogError::Conflict(author_has_books(id)));
        }

        self.repo.delete_author(id).await?;
        tracing::info!(author_id = %id, "Author deleted");
        Ok(())
    }

    // ==================== Books ====================

    pub async fn list_books(&self) -> CatalogResult<Vec<BookWithAuthor>> {
        Ok(self.repo.list_books().await?)
    }

    /// One book with its author, or `NotFound`.
    pub async fn get_book(&self, id: BookId) -> CatalogResult<BookWithAuthor> {
        Ok(self.repo.get_book(id).await?)
    }

    /// Like [`get_book`](Self::get_book) but absence is `None`.
    pub async fn find_book(&self, id: BookId) -> CatalogResult<Option<BookWithAuthor>> {
        match self.repo.get_book(id).await {
            Ok(book) => Ok(Some(book)),
            Err(StoreError::BookNotFound(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Books matching all given filters. Blank text filters are ignored.
    pub async fn search_books(&self, filter: BookFilter) -> CatalogResult<Vec<BookWithAuthor>> {
        Ok(self.repo.search_books(&filter.normalized()).await?)
    }

    /// Every book referencing `author_id`, without the author side.
    pub async fn books_by_author(&self, author_id: AuthorId) -> CatalogResult<Vec<Book>> {
        let books = self.repo.search_books(&BookFilter::by_author(author_id)).await?;
        Ok(books.into_iter().map(|view| view.book).collect())
    }

    /// Validates, checks the author reference and persists a new book,
    /// returning it with its author populated.
    pub async fn create_book(&self, input: &BookInput) -> CatalogResult<BookWithAuthor> {
        let book = input.validate()?;
        self.require_author(book.author_id).await?;

        let created = self.repo.insert_book(&book).await?;
        tracing::info!(
            book_id = %created.book.id,
            author_id = %created.author.id,
            "Book created"
        );
        Ok(created)
    }

    /// Overwrites every field of an existing book.
    pub async fn update_book(
        &self,
        id: BookId,
        payload_id: Option<BookId>,
        input: &BookInput,
    ) -> CatalogResult<Book> {
        check_identity(id, payload_id)?;
        let book = input.validate()?;

        self.get_book(id).await?;
        self.require_author(book.author_id).await?;

        let updated = self.repo.update_book(id, &book).await?;
        tracing::info!(book_id = %id, author_id = %updated.author_id, "Book updated");
        Ok(updated)
    }

    pub async fn delete_book(&self, id: BookId) -> CatalogResult<()> {
        self.repo.delete_book(id).await?;
        tracing::info!(book_id = %id, "Book deleted");
        Ok(())
    }

    async fn require_author(&self, author_id: AuthorId) -> CatalogResult<()> {
        if self.repo.author_exists(author_id).await? {
            Ok(())
        } else {
            tracing::debug!(%author_id, "Book rejected: unknown author");
            Err(CatalogError::Validation(unknown_author(author_id)))
        }
    }
}
