//! In-process mapping store backed by sharded concurrent maps.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::{LinkRepository, StoreError};

/// State of a short code key.
#[derive(Debug, Clone)]
enum Slot {
    Live(Link),
    /// Held by a deleted record; never allocated again.
    Retired,
}

impl Slot {
    fn live(&self) -> Option<&Link> {
        match self {
            Slot::Live(link) => Some(link),
            Slot::Retired => None,
        }
    }
}

/// Mapping store kept in process memory.
///
/// `by_code` is the primary map and the locus of uniqueness: inserts go through
/// the vacant-entry API, so a code is claimed by exactly one writer. `by_id` is
/// the secondary index. Mutations of an existing record hold its `by_id` entry for
/// their whole duration, which serializes rename/delete per record while other
/// shards stay available to readers.
///
/// Lock order is always `by_id` before `by_code`; `put` never holds both.
///
/// Data does not survive a restart. Intended for development and tests.
pub struct MemoryLinkRepository {
    by_code: DashMap<String, Slot>,
    by_id: DashMap<i64, String>,
    next_id: AtomicI64,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self {
            by_code: DashMap::new(),
            by_id: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Returns every live link, in no particular order.
    pub fn live_links(&self) -> Vec<Link> {
        self.by_code
            .iter()
            .filter_map(|slot| slot.value().live().cloned())
            .collect()
    }

    fn owned_by(&self, owner_ref: i64) -> Vec<Link> {
        let mut links: Vec<Link> = self
            .live_links()
            .into_iter()
            .filter(|link| link.owner_ref == Some(owner_ref))
            .collect();

        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        links
    }
}

impl Default for MemoryLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn put(&self, new_link: NewLink) -> Result<Link, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let link = Link::new(
            id,
            new_link.short_code,
            new_link.original_url,
            Utc::now(),
            new_link.owner_ref,
        );

        match self.by_code.entry(link.short_code.clone()) {
            Entry::Occupied(_) => {
                return Err(StoreError::Conflict {
                    code: link.short_code,
                });
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Slot::Live(link.clone()));
            }
        }

        // The id is not visible to anyone until this insert completes.
        self.by_id.insert(id, link.short_code.clone());

        Ok(link)
    }

    async fn get(&self, short_code: &str) -> Result<Option<Link>, StoreError> {
        Ok(self
            .by_code
            .get(short_code)
            .and_then(|slot| slot.value().live().cloned()))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Link>, StoreError> {
        let Some(code) = self.by_id.get(&id) else {
            return Ok(None);
        };

        Ok(self
            .by_code
            .get(code.value())
            .and_then(|slot| slot.value().live().cloned()))
    }

    async fn remove(&self, id: i64) -> Result<Link, StoreError> {
        let Entry::Occupied(id_entry) = self.by_id.entry(id) else {
            return Err(StoreError::NotFound);
        };

        let out_of_sync = || StoreError::Backend(format!("index out of sync for id {id}"));

        // Checked before anything is written, so a broken index leaves both maps as they were.
        let mut slot = self
            .by_code
            .get_mut(id_entry.get())
            .ok_or_else(out_of_sync)?;
        let removed = match slot.value() {
            Slot::Live(link) if link.id == id => link.clone(),
            _ => return Err(out_of_sync()),
        };

        *slot.value_mut() = Slot::Retired;
        drop(slot);
        id_entry.remove();
        Ok(removed)
    }

    async fn rename(&self, id: i64, new_code: &str) -> Result<Link, StoreError> {
        let Some(mut id_entry) = self.by_id.get_mut(&id) else {
            return Err(StoreError::NotFound);
        };

        let current_code = id_entry.value().clone();
        let current = self
            .by_code
            .get(&current_code)
            .and_then(|slot| slot.value().live().cloned())
            .ok_or(StoreError::NotFound)?;

        if current_code == new_code {
            return Ok(current);
        }

        let renamed = current.with_short_code(new_code);

        // Claim the new key before releasing the old one; readers may briefly find
        // the record under either code, each slot carrying the code it is keyed by.
        match self.by_code.entry(new_code.to_string()) {
            Entry::Occupied(_) => {
                return Err(StoreError::Conflict {
                    code: new_code.to_string(),
                });
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Slot::Live(renamed.clone()));
            }
        }

        self.by_code.remove(&current_code);
        *id_entry.value_mut() = new_code.to_string();

        Ok(renamed)
    }

    async fn list_by_owner(
        &self,
        owner_ref: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Link>, StoreError> {
        Ok(self
            .owned_by(owner_ref)
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_by_owner(&self, owner_ref: i64) -> Result<i64, StoreError> {
        Ok(self
            .by_code
            .iter()
            .filter(|slot| {
                slot.value()
                    .live()
                    .is_some_and(|link| link.owner_ref == Some(owner_ref))
            })
            .count() as i64)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
