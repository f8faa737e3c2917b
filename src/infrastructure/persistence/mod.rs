//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx. Queries are
//! checked at runtime, so the crate builds without a live database.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Durable mapping store
//! - [`PgTokenRepository`] - API token storage and validation

pub mod pg_link_repository;
pub mod pg_token_repository;

pub use pg_link_repository::PgLinkRepository;
pub use pg_token_repository::PgTokenRepository;

use crate::domain::repositories::StoreError;

/// Unique constraint guarding short code uniqueness (see `migrations/`).
pub(crate) const SHORT_CODE_CONSTRAINT: &str = "links_short_code_key";

/// Unique constraint on API token hashes.
pub(crate) const TOKEN_HASH_CONSTRAINT: &str = "api_tokens_token_hash_key";

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Returns true if `e` violates the named unique constraint.
pub(crate) fn is_unique_violation_on(e: &sqlx::Error, constraint: &str) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    db_err.is_unique_violation() && db_err.constraint() == Some(constraint)
}
