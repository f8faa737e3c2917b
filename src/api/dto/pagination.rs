//! Pagination query parameters.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination query parameters.
///
/// Uses `serde_with` to parse page numbers from query strings as integers.
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PaginationParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    #[validate(range(min = 1, message = "Page must be greater than 0"))]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    pub page_size: Option<u32>,
}

impl PaginationParams {
    /// Returns `(page, page_size)` with defaults applied.
    ///
    /// # Defaults
    ///
    /// - `page`: 1
    /// - `page_size`: 25
    pub fn resolve(&self) -> (u32, u32) {
        (
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

/// Paging metadata returned with list responses.
#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<u32>, page_size: Option<u32>) -> PaginationParams {
        PaginationParams { page, page_size }
    }

    #[test]
    fn test_defaults() {
        let p = params(None, None);
        assert!(p.validate().is_ok());
        assert_eq!(p.resolve(), (1, 25));
    }

    #[test]
    fn test_custom_page_and_size() {
        let p = params(Some(3), Some(50));
        assert!(p.validate().is_ok());
        assert_eq!(p.resolve(), (3, 50));
    }

    #[test]
    fn test_page_zero_is_error() {
        assert!(params(Some(0), None).validate().is_err());
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(params(None, Some(0)).validate().is_err());
        assert!(params(None, Some(1)).validate().is_ok());
        assert!(params(None, Some(MAX_PAGE_SIZE)).validate().is_ok());
        assert!(params(None, Some(MAX_PAGE_SIZE + 1)).validate().is_err());
    }

    #[test]
    fn test_parses_from_query_string_values() {
        let json = r#"{"page": "2", "page_size": "10"}"#;
        let p: PaginationParams = serde_json::from_str(json).unwrap();
        assert_eq!(p.resolve(), (2, 10));
    }

    #[test]
    fn test_non_numeric_page_is_error() {
        let json = r#"{"page": "two"}"#;
        assert!(serde_json::from_str::<PaginationParams>(json).is_err());
    }
}
