//! Helpers for driving the assembled application in tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use catalog_core::{
    Author, AuthorFilter, AuthorId, AuthorWithBooks, Book, BookFilter, BookId, BookWithAuthor,
    NewAuthor, NewBook,
};
use catalog_store::{CatalogRepository, MemoryCatalogStore, StoreError, StoreResult};
use serde_json::Value;
use tower::ServiceExt;

use crate::config::ServerConfig;
use crate::server::build_app;
use crate::state::AppState;

/// The full application over a freshly seeded in-memory store.
pub fn seeded_app() -> Router {
    app_with(Arc::new(MemoryCatalogStore::seeded()))
}

pub fn app_with(repository: Arc<dyn CatalogRepository>) -> Router {
    let config = ServerConfig::default();
    build_app(AppState::new(repository, config.clone()), &config)
}

/// Sends one request and returns status, headers and the JSON body
/// (`Value::Null` when the body is empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, headers, json)
}

/// A repository whose store is unreachable.
#[derive(Debug, Default)]
pub struct UnreachableRepository;

fn refused<T>() -> StoreResult<T> {
    Err(StoreError::Config(
        "connection refused: postgres://catalog:secret@db/catalog".to_string(),
    ))
}

#[async_trait]
impl CatalogRepository for UnreachableRepository {
    async fn ping(&self) -> StoreResult<()> {
        refused()
    }

    async fn get_author(&self, _id: AuthorId) -> StoreResult<AuthorWithBooks> {
        refused()
    }

    async fn author_exists(&self, _id: AuthorId) -> StoreResult<bool> {
        refused()
    }

    async fn find_author_by_email(&self, _email: &str) -> StoreResult<Option<Author>> {
        refused()
    }

    async fn search_authors(&self, _filter: &AuthorFilter) -> StoreResult<Vec<AuthorWithBooks>> {
        refused()
    }

    async fn insert_author(&self, _author: &NewAuthor) -> StoreResult<Author> {
        refused()
    }

    async fn update_author(&self, _id: AuthorId, _author: &NewAuthor) -> StoreResult<Author> {
        refused()
    }

    async fn delete_author(&self, _id: AuthorId) -> StoreResult<()> {
        refused()
    }

    async fn get_book(&self, _id: BookId) -> StoreResult<BookWithAuthor> {
        refused()
    }

    async fn search_books(&self, _filter: &BookFilter) -> StoreResult<Vec<BookWithAuthor>> {
        refused()
    }

    async fn insert_book(&self, _book: &NewBook) -> StoreResult<BookWithAuthor> {
        refused()
    }

    async fn update_book(&self, _id: BookId, _book: &NewBook) -> StoreResult<Book> {
        refused()
    }

    async fn delete_book(&self, _id: BookId) -> StoreResult<()> {
        refused()
    }
}
