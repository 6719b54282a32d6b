//! Application assembly: routes, middleware stack and logging.

use axum::{Router, body::Body, http::Request, middleware};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{CorsOrigins, LogFormat, ServerConfig};
use crate::middleware::request_id::{REQUEST_ID_HEADER, propagate_request_id, request_id_layer};
use crate::routes;
use crate::state::AppState;

/// Build the router with the full middleware stack.
///
/// From the outside in: request id assignment, tracing, request id echo,
/// CORS, per-request timeout.
pub fn build_app(state: AppState, config: &ServerConfig) -> Router {
    routes::build_router(state)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(build_cors_layer(&config.cors_allowed_origins))
        .layer(middleware::from_fn(propagate_request_id))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get(&REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");

            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id,
            )
        }))
        .layer(request_id_layer())
}

/// Build CORS layer from configuration.
pub fn build_cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let layer = match origins {
        CorsOrigins::Any => CorsLayer::new().allow_origin(Any),
        CorsOrigins::List(origins) => CorsLayer::new().allow_origin(origins.clone()),
    };

    layer
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([REQUEST_ID_HEADER])
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides `log_level`.
pub fn init_tracing(log_level: &str, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{UnreachableRepository, app_with, seeded_app, send};
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_request_id_is_generated_and_echoed() {
        let (_, headers, _) = send(&seeded_app(), Method::GET, "/health", None).await;
        let id = headers["x-request-id"].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_health_reports_unavailable_store() {
        let app = app_with(Arc::new(UnreachableRepository));
        let (status, _, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({ "status": "unavailable" }));
    }

    #[tokio::test]
    async fn test_store_failure_is_generic_500() {
        let app = app_with(Arc::new(UnreachableRepository));
        let (status, _, body) = send(&app, Method::GET, "/authors", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "error": { "code": "INTERNAL_ERROR", "message": "An internal error occurred" } })
        );
    }

    #[tokio::test]
    async fn test_graphql_store_failure_hides_detail() {
        let app = app_with(Arc::new(UnreachableRepository));
        let (status, _, body) = send(
            &app,
            Method::POST,
            "/graphql",
            Some(json!({ "query": "{ authors { id } }" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["errors"][0]["message"], "An internal error occurred");
        assert_eq!(body["errors"][0]["extensions"]["code"], "INTERNAL_ERROR");
    }

    /// Walks the documented scenario across both surfaces over one store.
    #[tokio::test]
    async fn test_author_book_lifecycle_scenario() {
        let app = seeded_app();

        let (status, headers, author) = send(
            &app,
            Method::POST,
            "/authors",
            Some(json!({ "name": "Ada Lovelace", "email": "ada@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(author["id"], 3);
        assert_eq!(headers["location"], "/authors/3");

        let (status, _, _) = send(
            &app,
            Method::POST,
            "/authors",
            Some(json!({ "name": "Ada Lovelace", "email": "ada@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        // GraphQL sees the same state and applies the same rule.
        let (_, _, body) = send(
            &app,
            Method::POST,
            "/graphql",
            Some(json!({
                "query": "mutation { addAuthor(name: \"Ada\", email: \"ada@example.com\") { id } }"
            })),
        )
        .await;
        assert_eq!(body["errors"][0]["extensions"]["code"], "CONFLICT");

        let (status, _, book) = send(
            &app,
            Method::POST,
            "/books",
            Some(json!({ "title": "Notes", "isbn": "111", "publicationYear": 1843, "authorId": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(book["author"]["id"], 3);
        let book_uri = format!("/books/{}", book["id"]);

        let (status, _, _) = send(&app, Method::DELETE, "/authors/3", None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _, _) = send(&app, Method::DELETE, &book_uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _, _) = send(&app, Method::DELETE, "/authors/3", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, _, body) = send(
            &app,
            Method::POST,
            "/graphql",
            Some(json!({ "query": "{ authorById(id: 3) { id } }" })),
        )
        .await;
        assert_eq!(body["data"]["authorById"], serde_json::Value::Null);
    }
}
