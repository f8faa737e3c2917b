//! Short link creation.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::{LinkRepository, StoreError};
use crate::error::AppError;
use crate::utils::code_generator::{CodeGenerator, is_reserved, validate_alias};
use crate::utils::url_validator::validate_url;

/// Default number of generate-and-insert rounds before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Creates links, choosing a short code when the caller does not supply one.
///
/// Uniqueness is decided by the store's atomic `put`, never by a prior lookup,
/// so two concurrent creations of the same alias cannot both succeed.
pub struct AllocationService {
    repository: Arc<dyn LinkRepository>,
    generator: Arc<dyn CodeGenerator>,
    max_attempts: u32,
}

impl AllocationService {
    /// Creates a new allocation service.
    ///
    /// `max_attempts` is raised to 1 if zero.
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        generator: Arc<dyn CodeGenerator>,
        max_attempts: u32,
    ) -> Self {
        Self {
            repository,
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Creates a link to `original_url`.
    ///
    /// # Code selection
    ///
    /// - With `custom_alias`: the alias is validated and inserted exactly once.
    /// - Without: candidates from the generator are inserted until one is free, up to
    ///   `max_attempts` rounds. Reserved candidates count as a round.
    ///
    /// The destination is stored byte-for-byte as given.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidUrl`] if the destination is not an absolute http(s) URL
    /// - [`AppError::InvalidAlias`] if the alias breaks the code rules
    /// - [`AppError::DuplicateAlias`] if the alias is taken or retired
    /// - [`AppError::AllocationExhausted`] if every generated candidate collided
    pub async fn create(
        &self,
        original_url: &str,
        custom_alias: Option<&str>,
        owner_ref: Option<i64>,
    ) -> Result<Link, AppError> {
        validate_url(original_url).map_err(|e| {
            AppError::invalid_url("Invalid URL", json!({ "reason": e.to_string() }))
        })?;

        if let Some(alias) = custom_alias {
            validate_alias(alias)?;

            let link = self
                .repository
                .put(NewLink {
                    short_code: alias.to_string(),
                    original_url: original_url.to_string(),
                    owner_ref,
                })
                .await?;

            info!(id = link.id, short_code = %link.short_code, "Link created with custom alias");
            return Ok(link);
        }

        for attempt in 1..=self.max_attempts {
            let candidate = self.generator.generate();

            if is_reserved(&candidate) {
                debug!(attempt, candidate = %candidate, "Generated reserved code, retrying");
                continue;
            }

            let new_link = NewLink {
                short_code: candidate,
                original_url: original_url.to_string(),
                owner_ref,
            };

            match self.repository.put(new_link).await {
                Ok(link) => {
                    info!(id = link.id, short_code = %link.short_code, attempt, "Link created");
                    return Ok(link);
                }
                Err(StoreError::Conflict { code }) => {
                    debug!(attempt, short_code = %code, "Generated code collided, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        error!(
            attempts = self.max_attempts,
            "Could not allocate a free short code"
        );
        Err(AppError::allocation_exhausted(
            "Could not allocate a short code, try again",
            json!({ "attempts": self.max_attempts }),
        ))
    }
}
