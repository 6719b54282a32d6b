//! Shape checks and normalisation for inbound payloads.
//!
//! Text fields are trimmed before they are checked or stored, and emails are
//! lowercased, so that uniqueness and lookups behave identically on every
//! path that writes an author.

use thiserror::Error;

use crate::types::{AuthorId, NewAuthor, NewBook};

/// A payload failed a structural check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field is missing or blank.
    #[error("{field} is required")]
    EmptyField { field: &'static str },

    /// The email does not look like `local@domain`.
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
}

/// Canonical form used for storing and looking up emails.
#[must_use]
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(value.to_string())
}

fn check_email(email: &str) -> Result<(), ValidationError> {
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(())
        }
        _ => Err(ValidationError::InvalidEmail(email.to_string())),
    }
}

impl NewAuthor {
    /// Normalises and checks author fields.
    ///
    /// # Errors
    ///
    /// Returns `EmptyField` for a blank name or email and `InvalidEmail` when
    /// the email has no single `@` separating non-empty parts.
    pub fn new(name: &str, email: &str) -> Result<Self, ValidationError> {
        let name = required("name", name)?;
        let email = normalize_email(&required("email", email)?);
        check_email(&email)?;
        Ok(Self { name, email })
    }
}

impl NewBook {
    /// Normalises and checks book fields.
    ///
    /// Whether `author_id` resolves to an existing author is a store-level
    /// question and is not checked here.
    ///
    /// # Errors
    ///
    /// Returns `EmptyField` for a blank title or isbn.
    pub fn new(
        title: &str,
        isbn: &str,
        publication_year: i32,
        author_id: AuthorId,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            title: required("title", title)?,
            isbn: required("isbn", isbn)?,
            publication_year,
            author_id,
        })
    }
}
