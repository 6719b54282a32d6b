//! Query and mutation roots.

use async_graphql::{Context, EmptySubscription, Object, Result, Schema};
use catalog_core::{AuthorFilter, AuthorId, BookFilter, BookId};

use super::types::{AuthorNode, BookNode, resolve, service};
use crate::service::{AuthorInput, BookInput, CatalogService};

/// The catalog GraphQL schema.
pub type CatalogSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Deepest selection nesting a query may use. Authors and books reference
/// each other, so deeper selections are rejected before execution.
pub const MAX_QUERY_DEPTH: usize = 6;

/// Build the schema over a shared service.
pub fn build_schema(service: CatalogService) -> CatalogSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(service)
        .limit_depth(MAX_QUERY_DEPTH)
        .finish()
}

#[derive(Debug, Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// All authors with their books.
    async fn authors(&self, ctx: &Context<'_>) -> Result<Vec<AuthorNode>> {
        let authors = resolve(service(ctx)?.list_authors().await)?;
        Ok(authors.into_iter().map(AuthorNode::from).collect())
    }

    /// All books with their author.
    async fn books(&self, ctx: &Context<'_>) -> Result<Vec<BookNode>> {
        let books = resolve(service(ctx)?.list_books().await)?;
        Ok(books.into_iter().map(BookNode::from).collect())
    }

    /// One author, or null when no author has this id.
    async fn author_by_id(&self, ctx: &Context<'_>, id: i32) -> Result<Option<AuthorNode>> {
        let author = resolve(service(ctx)?.find_author(AuthorId(id)).await)?;
        Ok(author.map(AuthorNode::from))
    }

    /// One book, or null when no book has this id.
    async fn book_by_id(&self, ctx: &Context<'_>, id: i32) -> Result<Option<BookNode>> {
        let book = resolve(service(ctx)?.find_book(BookId(id)).await)?;
        Ok(book.map(BookNode::from))
    }

    /// Authors whose name and email contain the given fragments, ignoring case.
    async fn search_authors(
        &self,
        ctx: &Context<'_>,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<Vec<AuthorNode>> {
        let filter = AuthorFilter { name, email };
        let authors = resolve(service(ctx)?.search_authors(filter).await)?;
        Ok(authors.into_iter().map(AuthorNode::from).collect())
    }

    /// Books matching every given filter. `title` is a case-insensitive
    /// fragment; the others are exact.
    async fn search_books(
        &self,
        ctx: &Context<'_>,
        title: Option<String>,
        isbn: Option<String>,
        publication_year: Option<i32>,
        author_id: Option<i32>,
    ) -> Result<Vec<BookNode>> {
        let filter = BookFilter {
            title,
            isbn,
            publication_year,
            author_id: author_id.map(AuthorId),
        };
        let books = resolve(service(ctx)?.search_books(filter).await)?;
        Ok(books.into_iter().map(BookNode::from).collect())
    }
}

#[derive(Debug, Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn add_author(
        &self,
        ctx: &Context<'_>,
        name: String,
        email: String,
    ) -> Result<AuthorNode> {
        let input = AuthorInput { name, email };
        let author = resolve(service(ctx)?.create_author(&input).await)?;
        Ok(AuthorNode::from(catalog_core::AuthorWithBooks::without_books(author)))
    }

    async fn add_book(
        &self,
        ctx: &Context<'_>,
        title: String,
        isbn: String,
        publication_year: i32,
        author_id: i32,
    ) -> Result<BookNode> {
        let input = BookInput {
            title,
            isbn,
            publication_year,
            author_id: AuthorId(author_id),
        };
        let book = resolve(service(ctx)?.create_book(&input).await)?;
        Ok(book.into())
    }

    async fn update_author(
        &self,
        ctx: &Context<'_>,
        id: i32,
        name: String,
        email: String,
    ) -> Result<AuthorNode> {
        let input = AuthorInput { name, email };
        let author = resolve(service(ctx)?.update_author(AuthorId(id), None, &input).await)?;
        Ok(AuthorNode::new(author))
    }

    /// True once the author is gone. Fails while books still reference it.
    async fn delete_author(&self, ctx: &Context<'_>, id: i32) -> Result<bool> {
        resolve(service(ctx)?.delete_author(AuthorId(id)).await)?;
        Ok(true)
    }

    async fn update_book(
        &self,
        ctx: &Context<'_>,
        id: i32,
        title: String,
        isbn: String,
        publication_year: i32,
        author_id: i32,
    ) -> Result<BookNode> {
        let input = BookInput {
            title,
            isbn,
            publication_year,
            author_id: AuthorId(author_id),
        };
        let book = resolve(service(ctx)?.update_book(BookId(id), None, &input).await)?;
        Ok(BookNode::new(book))
    }

    async fn delete_book(&self, ctx: &Context<'_>, id: i32) -> Result<bool> {
        resolve(service(ctx)?.delete_book(BookId(id)).await)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::Request;
    use catalog_store::MemoryCatalogStore;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn schema() -> CatalogSchema {
        build_schema(CatalogService::new(Arc::new(MemoryCatalogStore::seeded())))
    }

    async fn run(schema: &CatalogSchema, query: &str) -> Value {
        let response = schema.execute(Request::new(query)).await;
        serde_json::to_value(&response).unwrap()
    }

    fn error_code(response: &Value) -> &str {
        response["errors"][0]["extensions"]["code"].as_str().unwrap()
    }

    #[tokio::test]
    async fn test_authors_with_nested_books() {
        let response = run(&schema(), "{ authors { id name books { title author { email } } } }").await;

        assert_eq!(
            response["data"]["authors"][0],
            json!({
                "id": 1,
                "name": "J.K. Rowling",
                "books": [{ "title": "Harry Potter", "author": { "email": "jk.rowling@example.com" } }]
            })
        );
    }

    #[tokio::test]
    async fn test_books_with_author() {
        let response = run(&schema(), "{ books { title publicationYear authorId author { name } } }").await;

        assert_eq!(response["data"]["books"][1]["title"], "The Shining");
        assert_eq!(response["data"]["books"][1]["publicationYear"], 1977);
        assert_eq!(response["data"]["books"][1]["author"]["name"], "Stephen King");
    }

    #[tokio::test]
    async fn test_by_id_returns_null_when_missing() {
        let response = run(&schema(), "{ authorById(id: 99) { id } bookById(id: 2) { isbn } }").await;

        assert!(response.get("errors").is_none());
        assert_eq!(response["data"]["authorById"], Value::Null);
        assert_eq!(response["data"]["bookById"]["isbn"], "0987654321");
    }

    #[tokio::test]
    async fn test_search_queries() {
        let response = run(
            &schema(),
            r#"{ searchAuthors(name: "KING") { id } searchBooks(title: "zzz") { id } }"#,
        )
        .await;

        assert_eq!(response["data"]["searchAuthors"], json!([{ "id": 2 }]));
        assert_eq!(response["data"]["searchBooks"], json!([]));
    }

    #[tokio::test]
    async fn test_add_author_applies_uniqueness() {
        let schema = schema();
        let added = run(
            &schema,
            r#"mutation { addAuthor(name: "Ada Lovelace", email: "ada@example.com") { id books { id } } }"#,
        )
        .await;
        assert_eq!(added["data"]["addAuthor"], json!({ "id": 3, "books": [] }));

        let duplicate = run(
            &schema,
            r#"mutation { addAuthor(name: "Ada", email: "Ada@Example.com") { id } }"#,
        )
        .await;
        assert_eq!(error_code(&duplicate), "CONFLICT");
    }

    #[tokio::test]
    async fn test_add_book_rejects_unknown_author() {
        let response = run(
            &schema(),
            r#"mutation { addBook(title: "Notes", isbn: "111", publicationYear: 1843, authorId: 42) { id } }"#,
        )
        .await;
        assert_eq!(error_code(&response), "BAD_USER_INPUT");
    }

    #[tokio::test]
    async fn test_blank_fields_are_bad_user_input() {
        let response = run(
            &schema(),
            r#"mutation { addAuthor(name: "  ", email: "x@example.com") { id } }"#,
        )
        .await;
        assert_eq!(error_code(&response), "BAD_USER_INPUT");
        assert_eq!(response["errors"][0]["message"], "name is required");
    }

    #[tokio::test]
    async fn test_nesting_beyond_depth_limit_is_rejected() {
        let response = run(
            &schema(),
            "{ authors { books { author { books { author { books { author { id } } } } } } } }",
        )
        .await;

        assert!(response["errors"].as_array().is_some_and(|e| !e.is_empty()));
        assert_eq!(response["data"], Value::Null);
    }

    #[tokio::test]
    async fn test_update_and_delete_mutations() {
        let schema = schema();

        let guarded = run(&schema, "mutation { deleteAuthor(id: 1) }").await;
        assert_eq!(error_code(&guarded), "CONFLICT");

        let moved = run(
            &schema,
            r#"mutation { updateBook(id: 1, title: "Harry Potter", isbn: "1234567890", publicationYear: 1997, authorId: 2) { author { name } } }"#,
        )
        .await;
        assert_eq!(moved["data"]["updateBook"]["author"]["name"], "Stephen King");

        let renamed = run(
            &schema,
            r#"mutation { updateAuthor(id: 1, name: "Joanne Rowling", email: "jk.rowling@example.com") { name books { id } } }"#,
        )
        .await;
        assert_eq!(
            renamed["data"]["updateAuthor"],
            json!({ "name": "Joanne Rowling", "books": [] })
        );

        let deleted = run(&schema, "mutation { deleteAuthor(id: 1) }").await;
        assert_eq!(deleted["data"]["deleteAuthor"], true);

        let missing = run(&schema, "mutation { deleteBook(id: 77) }").await;
        assert_eq!(error_code(&missing), "NOT_FOUND");
    }
}
