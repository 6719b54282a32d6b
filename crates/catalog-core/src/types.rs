//! Core data types for the book catalog.
//!
//! Two fixed entities joined by a single one-to-many relation:
//!
//! - An `Author` owns zero or more books through their `author_id`
//! - A `Book` references exactly one existing `Author`
//!
//! Identities are assigned by the store and are never client-chosen on
//! create. JSON field names are camelCase (`publicationYear`, `authorId`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

// ============================================================================
// ID Types
// ============================================================================

/// Store-assigned identity of an author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(pub i32);

impl AuthorId {
    /// Returns the raw integer identity.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AuthorId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Store-assigned identity of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub i32);

impl BookId {
    /// Returns the raw integer identity.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A persisted author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    /// Normalised (trimmed, lowercase) and unique across all authors.
    pub email: String,
}

/// A persisted book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub isbn: String,
    pub publication_year: i32,
    pub author_id: AuthorId,
}

/// An author together with every book that references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorWithBooks {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<Book>,
}

impl AuthorWithBooks {
    /// An author with no books yet, as returned right after creation.
    #[must_use]
    pub fn without_books(author: Author) -> Self {
        Self {
            author,
            books: Vec::new(),
        }
    }

    /// Whether the delete-guard blocks removing this author.
    #[must_use]
    pub fn has_books(&self) -> bool {
        !self.books.is_empty()
    }
}

/// A book together with the author it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookWithAuthor {
    #[serde(flatten)]
    pub book: Book,
    pub author: Author,
}

// ============================================================================
// Write payloads
// ============================================================================

/// Field values for creating or overwriting an author.
///
/// Build through [`NewAuthor::new`] so that values are normalised and
/// shape-checked before they reach a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
    pub email: String,
}

/// Field values for creating or overwriting a book.
///
/// Build through [`NewBook::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub isbn: String,
    pub publication_year: i32,
    pub author_id: AuthorId,
}

// ============================================================================
// Search filters
// ============================================================================

/// Author search criteria. All provided filters must match.
///
/// `name` and `email` are case-insensitive substring matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorFilter {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl AuthorFilter {
    /// Trims every filter and drops the blank ones.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            name: non_blank(self.name),
            email: non_blank(self.email),
        }
    }

    /// Evaluates the filter against an author.
    #[must_use]
    pub fn matches(&self, author: &Author) -> bool {
        self.name
            .as_deref()
            .is_none_or(|needle| contains_ignore_case(&author.name, needle))
            && self
                .email
                .as_deref()
                .is_none_or(|needle| contains_ignore_case(&author.email, needle))
    }
}

/// Book search criteria. All provided filters must match.
///
/// `title` is a case-insensitive substring match; `isbn`,
/// `publication_year` and `author_id` are exact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub author_id: Option<AuthorId>,
}

impl BookFilter {
    /// Filter matching every book of one author.
    #[must_use]
    pub fn by_author(author_id: AuthorId) -> Self {
        Self {
            author_id: Some(author_id),
            ..Self::default()
        }
    }

    /// Trims the text filters and drops the blank ones.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            title: non_blank(self.title),
            isbn: non_blank(self.isbn),
            ..self
        }
    }

    /// Evaluates the filter against a book.
    #[must_use]
    pub fn matches(&self, book: &Book) -> bool {
        self.title
            .as_deref()
            .is_none_or(|needle| contains_ignore_case(&book.title, needle))
            && self.isbn.as_deref().is_none_or(|isbn| book.isbn == isbn)
            && self
                .publication_year
                .is_none_or(|year| book.publication_year == year)
            && self.author_id.is_none_or(|id| book.author_id == id)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
