//! Partial cache keys used to scope invalidation.
//!
//! A filter lists the fields that must match; every field left as `None` is a
//! wildcard. Matching compares typed fields directly.

use crate::query::SortDirection;

use super::{normalize_status_filter, CacheKey};

/// A partial [`CacheKey`] where absent fields match anything.
///
/// # Examples
///
/// ```
/// use pagedquery_core::cache::{CacheKey, CacheKeyFilter};
/// use pagedquery_core::query::SortDirection;
///
/// let key = CacheKey::new(3, 10, "", "all", "name", SortDirection::Asc, Some("a".into()));
///
/// assert!(CacheKeyFilter::owner(Some("a".into())).matches(&key));
/// assert!(!CacheKeyFilter::owner(Some("b".into())).matches(&key));
/// assert!(CacheKeyFilter::default().matches(&key));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheKeyFilter {
    pub page: Option<u32>,
    pub items_per_page: Option<u32>,
    pub search_term: Option<String>,
    pub status_filter: Option<String>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<SortDirection>,
    /// `Some(None)` matches only keys without an owner.
    pub owner_id: Option<Option<String>>,
}

impl CacheKeyFilter {
    /// Filter matching every key scoped to `owner_id`.
    pub fn owner(owner_id: Option<String>) -> Self {
        Self {
            owner_id: Some(owner_id.filter(|id| !id.is_empty())),
            ..Self::default()
        }
    }

    /// Restrict to a page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Restrict to a page size.
    pub fn with_items_per_page(mut self, items_per_page: u32) -> Self {
        self.items_per_page = Some(items_per_page);
        self
    }

    /// Restrict to a search term.
    pub fn with_search_term(mut self, search_term: impl Into<String>) -> Self {
        self.search_term = Some(search_term.into());
        self
    }

    /// Restrict to a status filter value.
    pub fn with_status_filter(mut self, status_filter: impl Into<String>) -> Self {
        self.status_filter = Some(normalize_status_filter(status_filter));
        self
    }

    /// Restrict to a sort field.
    pub fn with_sort_field(mut self, sort_field: impl Into<String>) -> Self {
        self.sort_field = Some(sort_field.into());
        self
    }

    /// Restrict to a sort direction.
    pub fn with_sort_direction(mut self, sort_direction: SortDirection) -> Self {
        self.sort_direction = Some(sort_direction);
        self
    }

    /// Returns true when every present field equals the key's field.
    pub fn matches(&self, key: &CacheKey) -> bool {
        fn field<T: PartialEq + ?Sized>(expected: Option<&T>, actual: &T) -> bool {
            expected.is_none_or(|e| e == actual)
        }

        field(self.page.as_ref(), &key.page)
            && field(self.items_per_page.as_ref(), &key.items_per_page)
            && field(self.search_term.as_deref(), key.search_term.as_str())
            && field(self.status_filter.as_deref(), key.status_filter.as_str())
            && field(self.sort_field.as_deref(), key.sort_field.as_str())
            && field(self.sort_direction.as_ref(), &key.sort_direction)
            && field(self.owner_id.as_ref(), &key.owner_id)
    }

    /// Returns true when no field is constrained.
    pub fn is_wildcard(&self) -> bool {
        *self == Self::default()
    }
}
