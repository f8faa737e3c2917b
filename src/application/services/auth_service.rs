//! Authentication service for API token validation.

use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::Sha256;
use std::sync::Arc;
use tracing::warn;

use crate::domain::repositories::{ApiToken, StoreError, TokenRepository};
use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Length of tokens produced by [`generate_token`].
pub const GENERATED_TOKEN_LENGTH: usize = 40;

/// The authenticated caller of a protected route.
///
/// `token_id` is the owner reference stamped on links the caller creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub token_id: i64,
    pub name: String,
}

/// Hashes a raw token with HMAC-SHA256 keyed by `signing_secret`.
///
/// Returns a 64-character lowercase hex-encoded MAC. Shared by the server and the
/// admin CLI so that tokens created offline authenticate online.
pub fn hash_token(signing_secret: &str, token: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Generates a random alphanumeric API token.
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Service for authenticating API requests via Bearer tokens.
///
/// Tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`) before storage
/// and comparison. An attacker with read-only access to the database cannot verify
/// or forge tokens without the server-side secret.
pub struct AuthService {
    repository: Arc<dyn TokenRepository>,
    signing_secret: String,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `repository` - token store
    /// - `signing_secret` - HMAC key; must match the value used when tokens were created
    pub fn new(repository: Arc<dyn TokenRepository>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Authenticates a raw token against stored credentials.
    ///
    /// On success, updates the `last_used` timestamp. A failure to record usage is
    /// logged and does not reject the request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is unknown or revoked.
    /// Returns [`AppError::Internal`] on store errors.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AppError> {
        let token_hash = hash_token(&self.signing_secret, token);

        let api_token = self
            .repository
            .find_active_by_hash(&token_hash)
            .await?
            .ok_or_else(|| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({"reason": "Invalid or revoked token"}),
                )
            })?;

        if let Err(e) = self.repository.update_last_used(api_token.id).await {
            warn!(token_id = api_token.id, error = %e, "Failed to record token usage");
        }

        Ok(Principal {
            token_id: api_token.id,
            name: api_token.name,
        })
    }

    /// Stores a new token under `name`.
    ///
    /// Only the hash is persisted; the caller must show `raw_token` to the user now.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the same token is already registered.
    pub async fn issue_token(&self, name: &str, raw_token: &str) -> Result<ApiToken, AppError> {
        let token_hash = hash_token(&self.signing_secret, raw_token);

        match self.repository.create_token(name, &token_hash).await {
            Ok(token) => Ok(token),
            Err(StoreError::Conflict { .. }) => Err(AppError::bad_request(
                "Token already exists",
                json!({ "name": name }),
            )),
            Err(e) => Err(e.into()),
        }
    }
}
