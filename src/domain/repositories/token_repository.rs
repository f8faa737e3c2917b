//! Repository trait for API token authentication.

use crate::domain::repositories::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// API token entity with metadata.
///
/// Tokens are stored as HMAC-SHA256 hashes. The token id doubles as the
/// `owner_ref` of the links it creates.
#[derive(Debug, Clone)]
pub struct ApiToken {
    pub id: i64,
    pub name: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Repository interface for API token management.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTokenRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryTokenRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Finds the active (non-revoked) token with the given hash.
    async fn find_active_by_hash(&self, token_hash: &str) -> Result<Option<ApiToken>, StoreError>;

    /// Updates the last_used timestamp for a token.
    async fn update_last_used(&self, token_id: i64) -> Result<(), StoreError>;

    /// Creates a new API token.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if a token with the same hash already exists.
    async fn create_token(&self, name: &str, token_hash: &str) -> Result<ApiToken, StoreError>;

    /// Lists all tokens in the system.
    async fn list_tokens(&self) -> Result<Vec<ApiToken>, StoreError>;

    /// Finds a token by its ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, StoreError>;

    /// Finds a token by its name.
    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, StoreError>;

    /// Revokes a token, preventing further authentication.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the token does not exist.
    async fn revoke_token(&self, id: i64) -> Result<(), StoreError>;
}
