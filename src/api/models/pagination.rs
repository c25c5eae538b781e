//! Page/limit query parameters shared by list endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Query-string pagination. Out-of-range values fall back to the defaults
/// rather than erroring, so `?page=0&limit=-5` behaves like no parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct Pagination {
    /// 1-based page number.
    pub page: Option<i64>,
    /// Items per page, capped at 100.
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn page(&self) -> i64 {
        match self.page {
            Some(page) if page >= 1 => page,
            _ => DEFAULT_PAGE,
        }
    }

    pub fn limit(&self) -> i64 {
        match self.limit {
            Some(limit) if (1..=MAX_LIMIT).contains(&limit) => limit,
            _ => DEFAULT_LIMIT,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// A page of results plus the total row count for the underlying query.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total_count: i64, pagination: &Pagination) -> Self {
        Self {
            data,
            total_count,
            page: pagination.page(),
            limit: pagination.limit(),
        }
    }
}
