//! Book routes.
//!
//! - GET /books - List books with their author
//! - GET /books/search - Filter books by title, isbn, year and author
//! - GET /books/{id} - One book with its author
//! - POST /books - Create a book for an existing author
//! - PUT /books/{id} - Overwrite every field of a book
//! - DELETE /books/{id} - Delete a book

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use catalog_core::{BookFilter, BookId, BookWithAuthor};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::service::BookInput;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

/// Query string for GET /books/search.
///
/// Numeric filters arrive as text so that `publicationYear=` counts as
/// absent rather than malformed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSearchParams {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub publication_year: Option<String>,
    pub author_id: Option<String>,
}

impl TryFrom<BookSearchParams> for BookFilter {
    type Error = ApiError;

    fn try_from(params: BookSearchParams) -> Result<Self, Self::Error> {
        Ok(Self {
            title: params.title,
            isbn: params.isbn,
            publication_year: parse_number("publicationYear", params.publication_year)?,
            author_id: parse_number("authorId", params.author_id)?,
        })
    }
}

fn parse_number<T: FromStr>(name: &str, raw: Option<String>) -> ApiResult<Option<T>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| {
            ApiError::BadRequest(format!("{} must be an integer, got '{}'", name, value))
        }),
    }
}

/// Request body for PUT /books/{id}.
#[derive(Debug, Deserialize)]
pub struct UpdateBookRequest {
    /// Must equal the path id.
    pub id: BookId,
    #[serde(flatten)]
    pub fields: BookInput,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /books - List all books, each with its author.
async fn list_books(State(state): State<AppState>) -> ApiResult<Json<Vec<BookWithAuthor>>> {
    Ok(Json(state.service().list_books().await?))
}

/// GET /books/search - Books matching every given filter.
///
/// `title` is a case-insensitive fragment; `isbn`, `publicationYear` and
/// `authorId` are exact.
///
/// # Response
///
/// - 200 OK: matching books, possibly none
/// - 400 Bad Request: a numeric filter is not an integer
async fn search_books(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<BookSearchParams>,
) -> ApiResult<Json<Vec<BookWithAuthor>>> {
    let filter = BookFilter::try_from(params)?;
    Ok(Json(state.service().search_books(filter).await?))
}

/// GET /books/{id} - One book with its author.
async fn get_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BookId>,
) -> ApiResult<Json<BookWithAuthor>> {
    Ok(Json(state.service().get_book(id).await?))
}

/// POST /books - Create a book.
///
/// # Response
///
/// - 201 Created: the book with its author, `Location: /books/{id}`
/// - 400 Bad Request: invalid fields or `authorId` names no author
async fn create_book(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<BookInput>,
) -> ApiResult<impl IntoResponse> {
    let book = state.service().create_book(&input).await?;
    let location = format!("/books/{}", book.book.id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(book)))
}

/// PUT /books/{id} - Overwrite title, isbn, year and author.
///
/// # Response
///
/// - 204 No Content: updated
/// - 400 Bad Request: missing or mismatched id, invalid fields or unknown author
/// - 404 Not Found: no book with this id
async fn update_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BookId>,
    ApiJson(request): ApiJson<UpdateBookRequest>,
) -> ApiResult<StatusCode> {
    state
        .service()
        .update_book(id, Some(request.id), &request.fields)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /books/{id} - Delete a book.
async fn delete_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BookId>,
) -> ApiResult<StatusCode> {
    state.service().delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Build book routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/search", get(search_books))
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
}
