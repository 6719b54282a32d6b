//! Author routes.
//!
//! - GET /authors - List authors with their books
//! - GET /authors/search - Filter authors by name and email fragments
//! - GET /authors/{id} - One author with its books
//! - POST /authors - Create an author
//! - PUT /authors/{id} - Overwrite name and email
//! - DELETE /authors/{id} - Delete an author without books

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use catalog_core::{AuthorFilter, AuthorId, AuthorWithBooks};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::service::AuthorInput;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

/// Query string for GET /authors/search.
#[derive(Debug, Default, Deserialize)]
pub struct AuthorSearchParams {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<AuthorSearchParams> for AuthorFilter {
    fn from(params: AuthorSearchParams) -> Self {
        Self {
            name: params.name,
            email: params.email,
        }
    }
}

/// Request body for PUT /authors/{id}.
#[derive(Debug, Deserialize)]
pub struct UpdateAuthorRequest {
    /// Must equal the path id.
    pub id: AuthorId,
    #[serde(flatten)]
    pub fields: AuthorInput,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /authors - List all authors, each with its books.
async fn list_authors(State(state): State<AppState>) -> ApiResult<Json<Vec<AuthorWithBooks>>> {
    Ok(Json(state.service().list_authors().await?))
}

/// GET /authors/search - Authors matching every given filter.
///
/// `name` and `email` are case-insensitive fragments; blank values are
/// ignored. No match is an empty list, not an error.
async fn search_authors(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<AuthorSearchParams>,
) -> ApiResult<Json<Vec<AuthorWithBooks>>> {
    Ok(Json(state.service().search_authors(params.into()).await?))
}

/// GET /authors/{id} - One author with its books.
///
/// # Response
///
/// - 200 OK: the author
/// - 404 Not Found: no author with this id
async fn get_author(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AuthorId>,
) -> ApiResult<Json<AuthorWithBooks>> {
    Ok(Json(state.service().get_author(id).await?))
}

/// POST /authors - Create an author.
///
/// # Response
///
/// - 201 Created: the author, with `Location: /authors/{id}`
/// - 400 Bad Request: blank name, malformed email or malformed body
/// - 409 Conflict: the email already belongs to an author
async fn create_author(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<AuthorInput>,
) -> ApiResult<impl IntoResponse> {
    let author = state.service().create_author(&input).await?;
    let location = format!("/authors/{}", author.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(AuthorWithBooks::without_books(author)),
    ))
}

/// PUT /authors/{id} - Overwrite name and email.
///
/// # Response
///
/// - 204 No Content: updated
/// - 400 Bad Request: missing or mismatched id, or invalid fields
/// - 404 Not Found: no author with this id
/// - 409 Conflict: the email belongs to another author
async fn update_author(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AuthorId>,
    ApiJson(request): ApiJson<UpdateAuthorRequest>,
) -> ApiResult<StatusCode> {
    state
        .service()
        .update_author(id, Some(request.id), &request.fields)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /authors/{id} - Delete an author.
///
/// # Response
///
/// - 204 No Content: deleted
/// - 404 Not Found: no author with this id
/// - 409 Conflict: books still reference the author
async fn delete_author(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AuthorId>,
) -> ApiResult<StatusCode> {
    state.service().delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Build author routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/authors", get(list_authors).post(create_author))
        .route("/authors/search", get(search_authors))
        .route(
            "/authors/{id}",
            get(get_author).put(update_author).delete(delete_author),
        )
}
