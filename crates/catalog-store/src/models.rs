//! Database models for the storage layer.
//!
//! These types map directly to query result rows and are converted into the
//! domain types from catalog-core before leaving the crate.

use catalog_core::{Author, AuthorId, AuthorWithBooks, Book, BookId, BookWithAuthor};
use sqlx::FromRow;

/// Database row for the `authors` table.
#[derive(Debug, Clone, FromRow)]
pub struct AuthorRow {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Self {
            id: AuthorId(row.id),
            name: row.name,
            email: row.email,
        }
    }
}

/// Database row for the `books` table.
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub publication_year: i32,
    pub author_id: i32,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: BookId(row.id),
            title: row.title,
            isbn: row.isbn,
            publication_year: row.publication_year,
            author_id: AuthorId(row.author_id),
        }
    }
}

/// A book joined with its author.
#[derive(Debug, Clone, FromRow)]
pub struct BookAuthorRow {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub publication_year: i32,
    pub author_id: i32,
    pub author_name: String,
    pub author_email: String,
}

impl From<BookAuthorRow> for BookWithAuthor {
    fn from(row: BookAuthorRow) -> Self {
        Self {
            author: Author {
                id: AuthorId(row.author_id),
                name: row.author_name,
                email: row.author_email,
            },
            book: Book {
                id: BookId(row.id),
                title: row.title,
                isbn: row.isbn,
                publication_year: row.publication_year,
                author_id: AuthorId(row.author_id),
            },
        }
    }
}

/// An author left-joined with one of its books; book columns are null for
/// authors without books.
#[derive(Debug, Clone, FromRow)]
pub struct AuthorBookRow {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub book_id: Option<i32>,
    pub book_title: Option<String>,
    pub book_isbn: Option<String>,
    pub book_publication_year: Option<i32>,
}

impl AuthorBookRow {
    fn book(&self) -> Option<Book> {
        Some(Book {
            id: BookId(self.book_id?),
            title: self.book_title.clone()?,
            isbn: self.book_isbn.clone()?,
            publication_year: self.book_publication_year?,
            author_id: AuthorId(self.id),
        })
    }
}

/// Folds joined rows, ordered by author id, into one view per author.
pub fn group_author_rows(rows: Vec<AuthorBookRow>) -> Vec<AuthorWithBooks> {
    let mut authors: Vec<AuthorWithBooks> = Vec::new();

    for row in rows {
        let book = row.book();
        if let Some(current) = authors
            .last_mut()
            .filter(|current| current.author.id.get() == row.id)
        {
            current.books.extend(book);
            continue;
        }

        authors.push(AuthorWithBooks {
            author: Author {
                id: AuthorId(row.id),
                name: row.name,
                email: row.email,
            },
            books: book.into_iter().collect(),
        });
    }

    authors
}
