//! GraphQL object types for authors and books.
//!
//! A node carries the relation when the read that produced it already
//! loaded it; otherwise the nested field asks the service.

use async_graphql::{Context, ErrorExtensions, Object, Result};
use catalog_core::{Author, AuthorWithBooks, Book, BookWithAuthor};

use crate::error::INTERNAL_ERROR_MESSAGE;
use crate::service::{CatalogError, CatalogResult, CatalogService};

impl ErrorExtensions for CatalogError {
    fn extend(&self) -> async_graphql::Error {
        let (code, message) = match self {
            Self::Validation(message) => ("BAD_USER_INPUT", message.as_str()),
            Self::NotFound(message) => ("NOT_FOUND", message.as_str()),
            Self::Conflict(message) => ("CONFLICT", message.as_str()),
            Self::Upstream(_) => ("INTERNAL_ERROR", INTERNAL_ERROR_MESSAGE),
        };

        async_graphql::Error::new(message).extend_with(|_, extensions| extensions.set("code", code))
    }
}

/// Converts a service result, keeping the outcome kind as `extensions.code`.
pub(crate) fn resolve<T>(result: CatalogResult<T>) -> Result<T> {
    result.map_err(|err| err.extend())
}

pub(crate) fn service<'a>(ctx: &Context<'a>) -> Result<&'a CatalogService> {
    ctx.data::<CatalogService>()
}

/// An author as exposed over GraphQL.
#[derive(Debug, Clone)]
pub struct AuthorNode {
    author: Author,
    books: Option<Vec<Book>>,
}

impl AuthorNode {
    /// A node whose books are loaded on demand.
    pub fn new(author: Author) -> Self {
        Self {
            author,
            books: None,
        }
    }
}

impl From<AuthorWithBooks> for AuthorNode {
    fn from(view: AuthorWithBooks) -> Self {
        Self {
            author: view.author,
            books: Some(view.books),
        }
    }
}

#[Object(name = "Author")]
impl AuthorNode {
    async fn id(&self) -> i32 {
        self.author.id.get()
    }

    async fn name(&self) -> &str {
        &self.author.name
    }

    async fn email(&self) -> &str {
        &self.author.email
    }

    /// Books referencing this author, by ascending id.
    async fn books(&self, ctx: &Context<'_>) -> Result<Vec<BookNode>> {
        let books = match &self.books {
            Some(books) => books.clone(),
            None => resolve(service(ctx)?.books_by_author(self.author.id).await)?,
        };

        Ok(books
            .into_iter()
            .map(|book| BookNode {
                book,
                author: Some(self.author.clone()),
            })
            .collect())
    }
}

/// A book as exposed over GraphQL.
#[derive(Debug, Clone)]
pub struct BookNode {
    book: Book,
    author: Option<Author>,
}

impl BookNode {
    /// A node whose author is loaded on demand.
    pub fn new(book: Book) -> Self {
        Self { book, author: None }
    }
}

impl From<BookWithAuthor> for BookNode {
    fn from(view: BookWithAuthor) -> Self {
        Self {
            book: view.book,
            author: Some(view.author),
        }
    }
}

#[Object(name = "Book")]
impl BookNode {
    async fn id(&self) -> i32 {
        self.book.id.get()
    }

    async fn title(&self) -> &str {
        &self.book.title
    }

    async fn isbn(&self) -> &str {
        &self.book.isbn
    }

    async fn publication_year(&self) -> i32 {
        self.book.publication_year
    }

    async fn author_id(&self) -> i32 {
        self.book.author_id.get()
    }

    async fn author(&self, ctx: &Context<'_>) -> Result<AuthorNode> {
        match &self.author {
            Some(author) => Ok(AuthorNode::new(author.clone())),
            None => {
                let view = resolve(service(ctx)?.get_author(self.book.author_id).await)?;
                Ok(view.into())
            }
        }
    }
}
