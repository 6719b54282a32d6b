//! catalog-core: Entity model for the book catalog
//!
//! This crate provides:
//! - The `Author` and `Book` records and their identity newtypes
//! - Eager-joined read views (`AuthorWithBooks`, `BookWithAuthor`)
//! - Write payloads (`NewAuthor`, `NewBook`) that can only be built from
//!   normalised, shape-checked input
//! - Search filters with a single, shared matching policy
//!
//! The relation between the two entities is one-directional: a `Book`
//! stores its `AuthorId`, and an author's books are always computed on read.

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{ValidationError, normalize_email};
