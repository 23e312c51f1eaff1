//! List envelopes, list parameters and pagination state.

use serde::{Deserialize, Serialize};

use super::status::Role;

/// The `{ "data": [...] }` envelope every list endpoint returns.
///
/// Pagination metadata is optional; the backend currently sends none of it,
/// in which case the total page count is unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl<T> ListResponse<T> {
    /// Wrap items without pagination metadata.
    #[must_use]
    pub const fn from_items(data: Vec<T>) -> Self {
        Self {
            data,
            total_items: None,
            total_pages: None,
            current_page: None,
            page_size: None,
        }
    }

    /// Returns `true` if the page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Search, page and limit parameters shared by the list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    /// Case-insensitive substring filter (empty matches everything).
    pub search: String,
    /// 1-based page number.
    pub page: u32,
    /// Page size, 1..=100.
    pub limit: u32,
}

impl ListParams {
    /// Default page size used by every list view.
    pub const DEFAULT_LIMIT: u32 = 10;
    /// Largest page size the backend accepts.
    pub const MAX_LIMIT: u32 = 100;

    /// Parameters for `page` with the given page size (both clamped to the
    /// ranges the backend accepts).
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            search: String::new(),
            page: page.max(1),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    /// Set the search filter.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Query-string pairs in the order the backend documents them.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("search", self.search.clone()),
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

impl Default for ListParams {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }
}

/// List parameters for `/users`, which also filters by role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserListParams {
    pub list: ListParams,
    pub role: Role,
}

impl UserListParams {
    /// Query-string pairs including the role filter.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.list.query_pairs();
        pairs.insert(1, ("role", self.role.to_string()));
        pairs
    }
}

/// Page cursor for Prev/Next navigation.
///
/// The total page count is optional; while it is unknown, `Next` stays
/// enabled on every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pager {
    page: u32,
    total_pages: Option<u32>,
}

impl Pager {
    /// Pager positioned on `page` (at least 1) with an unknown total.
    #[must_use]
    pub fn new(page: u32) -> Self {
        Self {
            page: page.max(1),
            total_pages: None,
        }
    }

    /// Current 1-based page.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Total page count, if the backend reported one.
    #[must_use]
    pub const fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    /// Record the total page count from a list response.
    pub const fn set_total_pages(&mut self, total_pages: Option<u32>) {
        self.total_pages = total_pages;
    }

    /// Whether a previous page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether a next page may exist.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        match self.total_pages {
            Some(total) => self.page < total,
            None => true,
        }
    }

    /// Move to the previous page. Returns `false` on page 1.
    pub const fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Move to the next page. Returns `false` past the known last page.
    pub const fn next(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Back to page 1 (a new query invalidates the old position).
    pub const fn reset(&mut self) {
        self.page = 1;
    }

    /// Page number to link to for "Prev", if any.
    #[must_use]
    pub const fn prev_page(&self) -> Option<u32> {
        if self.has_prev() { Some(self.page - 1) } else { None }
    }

    /// Page number to link to for "Next", if any.
    #[must_use]
    pub const fn next_page(&self) -> Option<u32> {
        if self.has_next() { Some(self.page + 1) } else { None }
    }

    /// Label such as `Page 2` or `Page 2 of 5`.
    #[must_use]
    pub fn label(&self) -> String {
        match self.total_pages {
            Some(total) if total > 0 => format!("Page {} of {total}", self.page),
            _ => format!("Page {}", self.page),
        }
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_list_params_clamp() {
        let params = ListParams::new(0, 500);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, ListParams::MAX_LIMIT);
        assert_eq!(ListParams::new(3, 0).limit, 1);
    }

    #[test]
    fn test_user_params_include_role() {
        let params = UserListParams {
            list: ListParams::default().with_search("ann"),
            role: Role::Admin,
        };
        let pairs = params.query_pairs();
        assert_eq!(pairs.first(), Some(&("search", "ann".to_string())));
        assert!(pairs.contains(&("role", "admin".to_string())));
        assert!(pairs.contains(&("limit", "10".to_string())));
    }

    #[test]
    fn test_list_response_without_metadata() {
        let response: ListResponse<u32> = serde_json::from_value(json!({"data": [1, 2]})).unwrap();
        assert_eq!(response.data, vec![1, 2]);
        assert!(response.total_pages.is_none());
    }

    #[test]
    fn test_pager_unknown_total_always_has_next() {
        let mut pager = Pager::new(1);
        assert!(!pager.has_prev());
        assert!(!pager.prev());
        for _ in 0..5 {
            assert!(pager.next());
        }
        assert_eq!(pager.page(), 6);
        assert_eq!(pager.label(), "Page 6");
    }

    #[test]
    fn test_pager_known_total_stops_at_last_page() {
        let mut pager = Pager::new(2);
        pager.set_total_pages(Some(3));
        assert!(pager.next());
        assert!(!pager.has_next());
        assert!(!pager.next());
        assert_eq!(pager.next_page(), None);
        assert_eq!(pager.prev_page(), Some(2));
        assert_eq!(pager.label(), "Page 3 of 3");
    }

    #[test]
    fn test_pager_reset() {
        let mut pager = Pager::new(4);
        pager.reset();
        assert_eq!(pager.page(), 1);
    }
}
