//! Pagination parameters for collection endpoints.
//!
//! Names follow the `page` / `itemsPerPage` query convention used by the
//! Hydra collection routes.

use serde::{Deserialize, Serialize};

/// Upper bound on `itemsPerPage`.
pub const MAX_ITEMS_PER_PAGE: u32 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_items_per_page() -> u32 {
    30
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            items_per_page: default_items_per_page(),
        }
    }
}

impl PageRequest {
    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * self.limit()
    }

    /// Returns the limit for database queries, clamped to `1..=MAX_ITEMS_PER_PAGE`.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.items_per_page.clamp(1, MAX_ITEMS_PER_PAGE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_default() {
        let request = PageRequest::default();
        assert_eq!(request.page, 1);
        assert_eq!(request.items_per_page, 30);
    }

    #[test]
    fn test_page_request_offset() {
        let request = PageRequest {
            page: 1,
            items_per_page: 20,
        };
        assert_eq!(request.offset(), 0);

        let request = PageRequest {
            page: 3,
            items_per_page: 20,
        };
        assert_eq!(request.offset(), 40);
    }

    #[test]
    fn test_page_zero_behaves_like_first_page() {
        let request = PageRequest {
            page: 0,
            items_per_page: 10,
        };
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_limit_is_clamped() {
        let request = PageRequest {
            page: 1,
            items_per_page: 5000,
        };
        assert_eq!(request.limit(), u64::from(MAX_ITEMS_PER_PAGE));

        let request = PageRequest {
            page: 1,
            items_per_page: 0,
        };
        assert_eq!(request.limit(), 1);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let request: PageRequest =
            serde_json::from_str(r#"{"page":2,"itemsPerPage":15}"#).unwrap();
        assert_eq!(request.page, 2);
        assert_eq!(request.items_per_page, 15);
    }
}
