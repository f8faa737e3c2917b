//! Redirect lookups.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::is_plausible_code;

/// Resolves short codes to destinations for the redirect path.
///
/// Reads go through the cache first. The store is never mutated here.
pub struct ResolutionService {
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
}

impl ResolutionService {
    pub fn new(repository: Arc<dyn LinkRepository>, cache: Arc<dyn CacheService>) -> Self {
        Self { repository, cache }
    }

    /// Returns the destination URL for `short_code`.
    ///
    /// A cache failure is logged and the lookup falls through to the store. After a
    /// store hit the cache is filled in a background task.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown, retired, or cannot be a
    /// valid code at all. Returns [`AppError::Internal`] on store errors.
    pub async fn resolve(&self, short_code: &str) -> Result<String, AppError> {
        if !is_plausible_code(short_code) {
            return Err(not_found(short_code));
        }

        match self.cache.get_url(short_code).await {
            Ok(Some(url)) => {
                debug!(short_code, "Cache HIT");
                return Ok(url);
            }
            Ok(None) => debug!(short_code, "Cache MISS"),
            Err(e) => warn!(short_code, error = %e, "Cache read failed, using store"),
        }

        let link = self
            .repository
            .get(short_code)
            .await?
            .ok_or_else(|| not_found(short_code))?;

        tokio::spawn(fill_cache(
            Arc::clone(&self.repository),
            Arc::clone(&self.cache),
            link.short_code.clone(),
            link.original_url.clone(),
        ));

        Ok(link.original_url)
    }
}

/// Writes `short_code -> original_url` to the cache, then confirms it against the store.
///
/// A rename or delete can commit and invalidate between the store read in
/// [`ResolutionService::resolve`] and the cache write here. The write would then
/// resurrect a code that no longer resolves, so the mapping is read again after the
/// write and the entry is evicted unless the store still agrees. Any mutation
/// committing after that second read runs its own invalidation, which lands after
/// this write.
async fn fill_cache(
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    short_code: String,
    original_url: String,
) {
    if let Err(e) = cache.set_url(&short_code, &original_url, None).await {
        warn!(short_code = %short_code, error = %e, "Cache fill failed");
        return;
    }

    let still_current = match repository.get(&short_code).await {
        Ok(link) => link.is_some_and(|link| link.original_url == original_url),
        Err(e) => {
            warn!(short_code = %short_code, error = %e, "Cache fill check failed");
            false
        }
    };

    if still_current {
        return;
    }

    debug!(short_code = %short_code, "Mapping changed during cache fill, evicting");
    if let Err(e) = cache.invalidate(&short_code).await {
        warn!(
            short_code = %short_code,
            error = %e,
            "Stale cache entry could not be evicted, entry will expire by TTL"
        );
    }
}

fn not_found(short_code: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "short_code": short_code }))
}
