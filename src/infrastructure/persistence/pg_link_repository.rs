//! PostgreSQL implementation of the mapping store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use super::{SHORT_CODE_CONSTRAINT, is_unique_violation_on};
use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::{LinkRepository, StoreError};

/// Row shape shared by every link query.
#[derive(Debug, sqlx::FromRow)]
struct LinkRow {
    id: i64,
    short_code: String,
    original_url: String,
    owner_ref: Option<i64>,
    created_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link::new(
            row.id,
            row.short_code,
            row.original_url,
            row.created_at,
            row.owner_ref,
        )
    }
}

/// PostgreSQL mapping store.
///
/// `links.short_code` is UNIQUE across live and soft-deleted rows, so the
/// database performs every check-then-act on a code atomically: a concurrent
/// `INSERT` or `UPDATE` targeting a taken code fails with a unique violation,
/// which is reported as [`StoreError::Conflict`]. Soft-deleted rows keep their
/// code, which retires it.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn conflict_or_backend(e: sqlx::Error, code: &str) -> StoreError {
    if is_unique_violation_on(&e, SHORT_CODE_CONSTRAINT) {
        StoreError::Conflict {
            code: code.to_string(),
        }
    } else {
        e.into()
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn put(&self, new_link: NewLink) -> Result<Link, StoreError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (short_code, original_url, owner_ref)
            VALUES ($1, $2, $3)
            RETURNING id, short_code, original_url, owner_ref, created_at
            "#,
        )
        .bind(&new_link.short_code)
        .bind(&new_link.original_url)
        .bind(new_link.owner_ref)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| conflict_or_backend(e, &new_link.short_code))?;

        Ok(row.into())
    }

    async fn get(&self, short_code: &str) -> Result<Option<Link>, StoreError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, short_code, original_url, owner_ref, created_at
            FROM links
            WHERE short_code = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Link>, StoreError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, short_code, original_url, owner_ref, created_at
            FROM links
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn remove(&self, id: i64) -> Result<Link, StoreError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            UPDATE links
            SET deleted_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, short_code, original_url, owner_ref, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Link::from).ok_or(StoreError::NotFound)
    }

    async fn rename(&self, id: i64, new_code: &str) -> Result<Link, StoreError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            UPDATE links
            SET short_code = $2
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, short_code, original_url, owner_ref, created_at
            "#,
        )
        .bind(id)
        .bind(new_code)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| conflict_or_backend(e, new_code))?;

        row.map(Link::from).ok_or(StoreError::NotFound)
    }

    async fn list_by_owner(
        &self,
        owner_ref: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Link>, StoreError> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, short_code, original_url, owner_ref, created_at
            FROM links
            WHERE owner_ref = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_ref)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn count_by_owner(&self, owner_ref: i64) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM links WHERE owner_ref = $1 AND deleted_at IS NULL",
        )
        .bind(owner_ref)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
