//! GraphQL access surface.
//!
//! Resolvers are thin: every query and mutation goes through the same
//! [`CatalogService`](crate::service::CatalogService) as the REST handlers,
//! so both surfaces accept and reject exactly the same inputs.

mod schema;
mod types;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Router,
    extract::State,
    response::{Html, IntoResponse},
    routing::{get, post},
};

use crate::state::AppState;

pub use schema::{CatalogSchema, MAX_QUERY_DEPTH, MutationRoot, QueryRoot, build_schema};
pub use types::{AuthorNode, BookNode};

/// Path the schema is served on.
pub const GRAPHQL_PATH: &str = "/graphql";

/// POST /graphql - Execute a query or mutation.
async fn graphql_handler(State(state): State<AppState>, request: GraphQLRequest) -> GraphQLResponse {
    state.schema().execute(request.into_inner()).await.into()
}

/// GET /graphql - GraphiQL IDE.
async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}

/// Build GraphQL routes, with GraphiQL when enabled.
pub fn routes(graphiql_enabled: bool) -> Router<AppState> {
    let route = if graphiql_enabled {
        get(graphiql).post(graphql_handler)
    } else {
        post(graphql_handler)
    };

    Router::new().route(GRAPHQL_PATH, route)
}
