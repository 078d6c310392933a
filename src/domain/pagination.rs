use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// A sanitized page request. Out-of-range values are clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self::with_bounds(page, limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }

    /// Missing or zero values fall back to the defaults; the rest is clamped
    /// to `1..` for the page and `1..=max_limit` for the limit. The page is
    /// also capped so that its offset still fits a signed 64-bit bind value.
    pub fn with_bounds(
        page: Option<i64>,
        limit: Option<i64>,
        default_limit: u64,
        max_limit: u64,
    ) -> Self {
        let max_limit = max_limit.max(1);
        let max_page = (i64::MAX as u64 / max_limit).max(1);
        let page = match page {
            Some(p) if p > 1 => (p as u64).min(max_page),
            _ => 1,
        };
        let limit = match limit {
            None | Some(0) => default_limit.clamp(1, max_limit),
            Some(l) if l < 0 => 1,
            Some(l) => (l as u64).clamp(1, max_limit),
        };
        Self { page, limit }
    }

    /// Lenient parse of raw query strings; anything non-numeric counts as missing.
    pub fn from_query(page: Option<&str>, limit: Option<&str>, default_limit: u64, max_limit: u64) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|v| v.trim().parse::<i64>().ok());
        Self::with_bounds(parse(page), parse(limit), default_limit, max_limit)
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    pub fn meta(&self, total: u64) -> PaginationMeta {
        PaginationMeta::new(self.page, self.limit, total)
    }
}

/// Pagination block attached to list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PaginationMeta {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = ((total + limit - 1) / limit).max(1);
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}
