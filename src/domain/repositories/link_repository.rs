//! Mapping store contract: short code to link, with a secondary index by id.

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::StoreError;
use async_trait::async_trait;

/// The mapping store.
///
/// Keyed by short code (the redirect path) with a secondary index by id (the
/// rename/delete path). Implementations must make every check-then-act sequence
/// on a short code atomic: two concurrent `put` calls for the same code yield
/// exactly one success.
///
/// Codes of deleted records are retired and never handed out again.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryLinkRepository`] - Sharded in-process map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link, assigning its `id` and `created_at`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the short code belongs to a live or
    /// retired record. Returns [`StoreError::Backend`] on storage failures.
    async fn put(&self, new_link: NewLink) -> Result<Link, StoreError>;

    /// Looks up a live link by short code.
    ///
    /// This is the redirect hot path.
    async fn get(&self, short_code: &str) -> Result<Option<Link>, StoreError>;

    /// Looks up a live link by id.
    async fn get_by_id(&self, id: i64) -> Result<Option<Link>, StoreError>;

    /// Deletes a link and retires its short code.
    ///
    /// Returns the link as it was at deletion time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `id` is unknown or already deleted.
    async fn remove(&self, id: i64) -> Result<Link, StoreError>;

    /// Atomically moves a link to a new short code.
    ///
    /// Renaming to the current code succeeds without changes. The vacated code
    /// becomes available immediately.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if `new_code` belongs to a different live
    /// or retired record, [`StoreError::NotFound`] if `id` is not live.
    async fn rename(&self, id: i64, new_code: &str) -> Result<Link, StoreError>;

    /// Lists live links created by `owner_ref`, newest first.
    async fn list_by_owner(
        &self,
        owner_ref: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Link>, StoreError>;

    /// Counts live links created by `owner_ref`.
    async fn count_by_owner(&self, owner_ref: i64) -> Result<i64, StoreError>;

    /// Returns true if the backing storage is reachable.
    async fn health_check(&self) -> bool;
}
