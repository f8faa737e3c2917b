//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::dto::pagination::PageMeta;
use crate::domain::entities::Link;

/// Request to create a short link.
///
/// Only the shape is checked here. URL and alias rules are enforced by the
/// allocation service so they report their own error kinds.
#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    /// Destination, stored exactly as given.
    pub url: String,

    /// Optional caller-chosen short code.
    #[serde(default)]
    pub custom_alias: Option<String>,
}

/// Request to move a link to a new short code.
#[derive(Debug, Deserialize)]
pub struct RenameLinkRequest {
    pub short_code: String,
}

/// JSON representation of a link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub short_url: String,
    pub created_at: DateTime<Utc>,
}

impl LinkResponse {
    /// Builds the response, prefixing the code with `public_base_url`.
    pub fn from_link(link: Link, public_base_url: &str) -> Self {
        let short_url = format!("{}/{}", public_base_url.trim_end_matches('/'), link.short_code);
        Self {
            id: link.id,
            original_url: link.original_url,
            short_code: link.short_code,
            short_url,
            created_at: link.created_at,
        }
    }
}

/// One page of the caller's links.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub pagination: PageMeta,
    pub items: Vec<LinkResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_response_short_url() {
        let link = Link::new(
            4,
            "abc123".to_string(),
            "https://example.com".to_string(),
            Utc::now(),
            Some(1),
        );

        let response = LinkResponse::from_link(link, "https://sho.rt/");

        assert_eq!(response.short_url, "https://sho.rt/abc123");
        assert_eq!(response.id, 4);
    }

    #[test]
    fn test_create_request_alias_is_optional() {
        let req: CreateLinkRequest =
            serde_json::from_str(r#"{"url": "https://example.com"}"#).unwrap();
        assert!(req.custom_alias.is_none());
    }
}
