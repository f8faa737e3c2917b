//! Rename, delete and listing of existing links.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::validate_alias;

/// Manages links after creation.
///
/// Every mutation is scoped to the acting owner. `actor = None` is the privileged
/// path used by administrative tooling. Links owned by someone else are reported as
/// missing so their existence is never revealed.
pub struct LifecycleService {
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
}

impl LifecycleService {
    pub fn new(repository: Arc<dyn LinkRepository>, cache: Arc<dyn CacheService>) -> Self {
        Self { repository, cache }
    }

    /// Moves link `id` to `new_code`, keeping its id, destination and creation time.
    ///
    /// The old code is freed. Renaming to the current code returns the link unchanged.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidAlias`] if `new_code` breaks the code rules
    /// - [`AppError::NotFound`] if the link does not exist or is not the actor's
    /// - [`AppError::DuplicateAlias`] if `new_code` is held by another link or retired
    pub async fn rename(
        &self,
        id: i64,
        new_code: &str,
        actor: Option<i64>,
    ) -> Result<Link, AppError> {
        validate_alias(new_code)?;

        let current = self.find_owned(id, actor).await?;
        if current.short_code == new_code {
            return Ok(current);
        }

        let renamed = self.repository.rename(id, new_code).await?;

        info!(
            id,
            from = %current.short_code,
            to = %renamed.short_code,
            "Link renamed"
        );
        self.invalidate(&current.short_code).await;

        Ok(renamed)
    }

    /// Deletes link `id` and retires its code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist, was already deleted,
    /// or is not the actor's.
    pub async fn delete(&self, id: i64, actor: Option<i64>) -> Result<(), AppError> {
        self.find_owned(id, actor).await?;

        let removed = self.repository.remove(id).await?;

        info!(id, short_code = %removed.short_code, "Link deleted");
        self.invalidate(&removed.short_code).await;

        Ok(())
    }

    /// Returns one page of `owner`'s links, newest first, and the owner's total.
    ///
    /// `page` starts at 1.
    pub async fn list(
        &self,
        owner: i64,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Link>, i64), AppError> {
        let limit = i64::from(page_size.max(1));
        let offset = i64::from(page.max(1) - 1) * limit;

        let links = self.repository.list_by_owner(owner, offset, limit).await?;
        let total = self.repository.count_by_owner(owner).await?;

        Ok((links, total))
    }

    async fn find_owned(&self, id: i64, actor: Option<i64>) -> Result<Link, AppError> {
        self.repository
            .get_by_id(id)
            .await?
            .filter(|link| link.is_accessible_by(actor))
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))
    }

    async fn invalidate(&self, short_code: &str) {
        if let Err(e) = self.cache.invalidate(short_code).await {
            warn!(
                short_code,
                error = %e,
                "Cache invalidation failed, entry will expire by TTL"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockLinkRepository, StoreError};
    use crate::infrastructure::cache::{CacheResult, NullCache};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Records every invalidated code.
    #[derive(Default)]
    struct RecordingCache(Mutex<Vec<String>>);

    impl RecordingCache {
        fn invalidated(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CacheService for RecordingCache {
        async fn get_url(&self, _: &str) -> CacheResult<Option<String>> {
            Ok(None)
        }
        async fn set_url(&self, _: &str, _: &str, _: Option<u64>) -> CacheResult<()> {
            Ok(())
        }
        async fn invalidate(&self, code: &str) -> CacheResult<()> {
            self.0.lock().unwrap().push(code.to_string());
            Ok(())
        }
        async fn health_check(&self) -> bool {
            true
        }
        fn backend_name(&self) -> &'static str {
            "recording"
        }
    }

    fn link(id: i64, code: &str, owner_ref: Option<i64>) -> Link {
        Link::new(
            id,
            code.to_string(),
            "https://example.com".to_string(),
            Utc::now(),
            owner_ref,
        )
    }

    fn service(repo: MockLinkRepository) -> LifecycleService {
        LifecycleService::new(Arc::new(repo), Arc::new(NullCache::new()))
    }

    #[tokio::test]
    async fn test_rename_success() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get_by_id()
            .returning(|id| Ok(Some(link(id, "abc123", Some(1)))));
        repo.expect_rename()
            .withf(|id, code| *id == 5 && code == "xyz789")
            .times(1)
            .returning(|id, code| Ok(link(id, code, Some(1))));

        let renamed = service(repo).rename(5, "xyz789", Some(1)).await.unwrap();

        assert_eq!(renamed.id, 5);
        assert_eq!(renamed.short_code, "xyz789");
    }

    #[tokio::test]
    async fn test_rename_to_same_code_is_noop() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get_by_id()
            .returning(|id| Ok(Some(link(id, "abc123", None))));
        repo.expect_rename().never();

        let link = service(repo).rename(5, "abc123", None).await.unwrap();

        assert_eq!(link.short_code, "abc123");
    }

    #[tokio::test]
    async fn test_rename_invalid_code_checked_first() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get_by_id().never();

        let err = service(repo).rename(5, "a b", None).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidAlias { .. }));
    }

    #[tokio::test]
    async fn test_rename_foreign_link_is_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get_by_id()
            .returning(|id| Ok(Some(link(id, "abc123", Some(1)))));
        repo.expect_rename().never();

        let err = service(repo)
            .rename(5, "xyz789", Some(2))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_rename_onto_taken_code() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get_by_id()
            .returning(|id| Ok(Some(link(id, "abc123", None))));
        repo.expect_rename().returning(|_, code| {
            Err(StoreError::Conflict {
                code: code.to_string(),
            })
        });

        let err = service(repo).rename(5, "taken", None).await.unwrap_err();

        assert!(matches!(err, AppError::DuplicateAlias { .. }));
    }

    #[tokio::test]
    async fn test_delete_success() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get_by_id()
            .returning(|id| Ok(Some(link(id, "abc123", Some(3)))));
        repo.expect_remove()
            .withf(|id| *id == 9)
            .times(1)
            .returning(|id| Ok(link(id, "abc123", Some(3))));

        assert!(service(repo).delete(9, Some(3)).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));
        repo.expect_remove().never();

        let err = service(repo).delete(9, None).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_racing_delete_is_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get_by_id()
            .returning(|id| Ok(Some(link(id, "abc123", None))));
        repo.expect_remove().returning(|_| Err(StoreError::NotFound));

        let err = service(repo).delete(9, None).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_computes_offset() {
        let mut repo = MockLinkRepository::new();
        repo.expect_list_by_owner()
            .withf(|owner, offset, limit| *owner == 2 && *offset == 50 && *limit == 25)
            .times(1)
            .returning(|_, _, _| Ok(vec![link(1, "abc123", Some(2))]));
        repo.expect_count_by_owner().returning(|_| Ok(51));

        let (links, total) = service(repo).list(2, 3, 25).await.unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(total, 51);
    }

    #[tokio::test]
    async fn test_rename_invalidates_old_code() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get_by_id()
            .returning(|id| Ok(Some(link(id, "abc123", None))));
        repo.expect_rename()
            .returning(|id, code| Ok(link(id, code, None)));
        let cache = Arc::new(RecordingCache::default());

        LifecycleService::new(Arc::new(repo), cache.clone())
            .rename(5, "xyz789", None)
            .await
            .unwrap();

        assert_eq!(cache.invalidated(), vec!["abc123".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_invalidates_code() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get_by_id()
            .returning(|id| Ok(Some(link(id, "abc123", None))));
        repo.expect_remove()
            .returning(|id| Ok(link(id, "abc123", None)));
        let cache = Arc::new(RecordingCache::default());

        LifecycleService::new(Arc::new(repo), cache.clone())
            .delete(9, None)
            .await
            .unwrap();

        assert_eq!(cache.invalidated(), vec!["abc123".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_rename_leaves_cache_alone() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get_by_id()
            .returning(|id| Ok(Some(link(id, "abc123", None))));
        repo.expect_rename().returning(|_, code| {
            Err(StoreError::Conflict {
                code: code.to_string(),
            })
        });
        let cache = Arc::new(RecordingCache::default());

        let result = LifecycleService::new(Arc::new(repo), cache.clone())
            .rename(5, "taken", None)
            .await;

        assert!(result.is_err());
        assert!(cache.invalidated().is_empty());
    }
}
