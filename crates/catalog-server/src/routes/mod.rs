//! Route definitions for the HTTP API.

pub mod authors;
pub mod books;
pub mod health;

use axum::Router;

use crate::graphql;
use crate::state::AppState;

/// Build the complete router with all routes.
pub fn build_router(state: AppState) -> Router {
    let graphiql_enabled = state.config().graphiql_enabled;

    Router::new()
        .merge(health::routes())
        .merge(authors::routes())
        .merge(books::routes())
        .merge(graphql::routes(graphiql_enabled))
        .with_state(state)
}
