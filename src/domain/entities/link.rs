//! Link entity representing a short code mapping.

use chrono::{DateTime, Utc};

/// A live shortened link.
///
/// `id`, `original_url` and `created_at` never change after creation. Only
/// `short_code` is mutable, and only through a rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    /// API token id of the creator. Used for authorization only.
    pub owner_ref: Option<i64>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        short_code: String,
        original_url: String,
        created_at: DateTime<Utc>,
        owner_ref: Option<i64>,
    ) -> Self {
        Self {
            id,
            short_code,
            original_url,
            created_at,
            owner_ref,
        }
    }

    /// Returns true if `actor` may modify this link.
    ///
    /// `None` is the privileged actor (administrative tooling).
    pub fn is_accessible_by(&self, actor: Option<i64>) -> bool {
        match actor {
            None => true,
            Some(actor) => self.owner_ref == Some(actor),
        }
    }

    /// Returns a copy of this link carrying a different short code.
    pub fn with_short_code(&self, short_code: impl Into<String>) -> Self {
        Self {
            short_code: short_code.into(),
            ..self.clone()
        }
    }
}

/// Input data for inserting a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub short_code: String,
    pub original_url: String,
    pub owner_ref: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(owner_ref: Option<i64>) -> Link {
        Link::new(
            1,
            "abc123".to_string(),
            "https://example.com".to_string(),
            Utc::now(),
            owner_ref,
        )
    }

    #[test]
    fn test_link_creation() {
        let now = Utc::now();
        let link = Link::new(
            7,
            "abc123".to_string(),
            "https://example.com/a".to_string(),
            now,
            Some(3),
        );

        assert_eq!(link.id, 7);
        assert_eq!(link.short_code, "abc123");
        assert_eq!(link.original_url, "https://example.com/a");
        assert_eq!(link.created_at, now);
        assert_eq!(link.owner_ref, Some(3));
    }

    #[test]
    fn test_owner_can_access() {
        assert!(sample(Some(3)).is_accessible_by(Some(3)));
    }

    #[test]
    fn test_other_principal_cannot_access() {
        assert!(!sample(Some(3)).is_accessible_by(Some(4)));
        assert!(!sample(None).is_accessible_by(Some(4)));
    }

    #[test]
    fn test_privileged_actor_can_access_anything() {
        assert!(sample(Some(3)).is_accessible_by(None));
        assert!(sample(None).is_accessible_by(None));
    }

    #[test]
    fn test_with_short_code_keeps_identity() {
        let link = sample(Some(1));
        let renamed = link.with_short_code("xyz789");

        assert_eq!(renamed.id, link.id);
        assert_eq!(renamed.original_url, link.original_url);
        assert_eq!(renamed.created_at, link.created_at);
        assert_eq!(renamed.short_code, "xyz789");
    }
}
