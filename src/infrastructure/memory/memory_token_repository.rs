//! In-process API token store.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::repositories::{ApiToken, StoreError, TokenRepository};

/// Token store kept in process memory, keyed by token hash.
pub struct MemoryTokenRepository {
    by_hash: DashMap<String, ApiToken>,
    next_id: AtomicI64,
}

impl MemoryTokenRepository {
    pub fn new() -> Self {
        Self {
            by_hash: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    fn find(&self, predicate: impl Fn(&ApiToken) -> bool) -> Option<ApiToken> {
        self.by_hash
            .iter()
            .find(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
    }
}

impl Default for MemoryTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRepository for MemoryTokenRepository {
    async fn find_active_by_hash(&self, token_hash: &str) -> Result<Option<ApiToken>, StoreError> {
        Ok(self
            .by_hash
            .get(token_hash)
            .filter(|token| token.revoked_at.is_none())
            .map(|token| token.value().clone()))
    }

    async fn update_last_used(&self, _token_id: i64) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_token(&self, name: &str, token_hash: &str) -> Result<ApiToken, StoreError> {
        match self.by_hash.entry(token_hash.to_string()) {
            Entry::Occupied(_) => Err(StoreError::Conflict {
                code: name.to_string(),
            }),
            Entry::Vacant(vacant) => {
                let token = ApiToken {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed),
                    name: name.to_string(),
                    token_hash: token_hash.to_string(),
                    created_at: Utc::now(),
                    revoked_at: None,
                };
                vacant.insert(token.clone());
                Ok(token)
            }
        }
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, StoreError> {
        let mut tokens: Vec<ApiToken> = self.by_hash.iter().map(|t| t.value().clone()).collect();
        tokens.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tokens)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, StoreError> {
        Ok(self.find(|token| token.id == id))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, StoreError> {
        Ok(self.find(|token| token.name == name))
    }

    async fn revoke_token(&self, id: i64) -> Result<(), StoreError> {
        let hash = self
            .find(|token| token.id == id)
            .map(|token| token.token_hash)
            .ok_or(StoreError::NotFound)?;

        if let Some(mut token) = self.by_hash.get_mut(&hash) {
            token.revoked_at.get_or_insert_with(Utc::now);
        }

        Ok(())
    }
}
