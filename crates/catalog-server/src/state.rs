//! Application state shared across handlers.

use std::sync::Arc;

use catalog_store::CatalogRepository;

use crate::config::ServerConfig;
use crate::graphql::{CatalogSchema, build_schema};
use crate::service::CatalogService;

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Consistency rules over the repository.
    service: CatalogService,
    /// GraphQL schema executing against the same service.
    schema: CatalogSchema,
    /// Server configuration.
    config: Arc<ServerConfig>,
}

impl AppState {
    /// Create new application state.
    pub fn new(repository: Arc<dyn CatalogRepository>, config: ServerConfig) -> Self {
        let service = CatalogService::new(repository);
        Self {
            schema: build_schema(service.clone()),
            service,
            config: Arc::new(config),
        }
    }

    /// Get a reference to the catalog service.
    pub fn service(&self) -> &CatalogService {
        &self.service
    }

    /// Get a reference to the GraphQL schema.
    pub fn schema(&self) -> &CatalogSchema {
        &self.schema
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
