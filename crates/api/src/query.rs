//! Shared query parameter types for API handlers.

use habitual_core::pagination::{clamp_limit, clamp_page, offset};
use serde::Deserialize;

/// `?page=&limit=&search=` for the admin listings.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

impl PaginationParams {
    /// Clamped `(page, limit, offset)`.
    pub fn window(&self) -> (i64, i64, i64) {
        let page = clamp_page(self.page);
        let limit = clamp_limit(self.limit);
        (page, limit, offset(page, limit))
    }

    /// Trimmed search term, `None` when blank.
    pub fn search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_applies_defaults_and_bounds() {
        assert_eq!(PaginationParams::default().window(), (1, 10, 0));

        let params = PaginationParams {
            page: Some(3),
            limit: Some(500),
            search: None,
        };
        assert_eq!(params.window(), (3, 100, 200));

        let params = PaginationParams {
            page: Some(-2),
            limit: Some(0),
            search: None,
        };
        assert_eq!(params.window(), (1, 1, 0));
    }

    #[test]
    fn blank_search_is_ignored() {
        let params = PaginationParams {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(params.search(), None);

        let params = PaginationParams {
            search: Some(" run ".into()),
            ..Default::default()
        };
        assert_eq!(params.search(), Some("run"));
    }
}
