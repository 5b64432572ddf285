//! Page-size handling for the graph listing endpoints.
//!
//! Listings page by rowid, which the caller passes in the path; only the
//! page size travels in the query string.

use serde::Deserialize;

/// Default page size when `limit` is not specified.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Default upper bound on `limit`.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Query parameters accepted by listing endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

impl LimitParams {
    /// Effective page size: `default` when absent, clamped to `[1, max]`.
    pub fn effective_limit(&self, default: usize, max: usize) -> usize {
        let max = max.max(1);
        self.limit.unwrap_or(default).clamp(1, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_limit_uses_default() {
        let p = LimitParams::default();
        assert_eq!(p.effective_limit(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE), 100);
    }

    #[test]
    fn limit_is_clamped() {
        let huge = LimitParams { limit: Some(5000) };
        assert_eq!(huge.effective_limit(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE), 1000);
        let zero = LimitParams { limit: Some(0) };
        assert_eq!(zero.effective_limit(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE), 1);
    }

    #[test]
    fn default_above_max_is_clamped_too() {
        let p = LimitParams::default();
        assert_eq!(p.effective_limit(500, 50), 50);
    }
}
