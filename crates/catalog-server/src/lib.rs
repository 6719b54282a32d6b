//! catalog-server: REST and GraphQL server for the book catalog
//!
//! This crate provides:
//! - `CatalogService`, the one rule set for email uniqueness, book-to-author
//!   references and the author delete-guard
//! - REST endpoints under `/authors` and `/books`
//! - A GraphQL endpoint at `/graphql` over the same service
//! - Health checks, request ids, CORS and request timeouts
//!
//! # Usage
//!
//! ```rust,ignore
//! use catalog_server::{AppState, ServerConfig, server::build_app};
//! use catalog_store::{StoreConfig, open};
//!
//! let config = ServerConfig::from_env()?;
//! let repository = open(&StoreConfig::from_env()?).await?;
//! let app = build_app(AppState::new(repository, config.clone()), &config);
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod graphql;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod service;
pub mod state;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use service::{CatalogError, CatalogService};
pub use state::AppState;

// Re-export dependent crates
pub use catalog_core;
pub use catalog_store;
