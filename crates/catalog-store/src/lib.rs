//! catalog-store: Storage layer for the book catalog
//!
//! This crate provides:
//! - The `CatalogRepository` contract shared by every backend
//! - A PostgreSQL backend on sqlx with transactional writes
//! - An in-process backend with the same semantics, for development and tests
//! - Embedded migrations and first-run seed data
//!
//! # Usage
//!
//! ```rust,ignore
//! use catalog_store::{StoreConfig, open};
//!
//! let config = StoreConfig::from_env()?;
//! let repository = open(&config).await?;
//!
//! let authors = repository.list_authors().await?;
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod repository;
pub mod schema;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryCatalogStore;
pub use repository::{CatalogRepository, open};
pub use store::{PgCatalogStore, StoreBackend, StoreConfig};

// Re-export catalog-core for downstream crates
pub use catalog_core;
