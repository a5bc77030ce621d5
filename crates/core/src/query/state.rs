//! Query-shaping state and its transitions.
//!
//! Pure data: every mutation reports whether anything changed so the caller
//! can decide what to invalidate and whether to reload.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::cache::{normalize_status_filter, CacheKey, ALL_STATUSES, DEFAULT_ITEMS_PER_PAGE};

use super::{dependency_key, FetchParams, SortDirection};

/// Sort field used when none is configured.
pub const DEFAULT_SORT_FIELD: &str = "created_at";

/// State that parameterizes a paginated query.
///
/// Changing the search term, status filter, or page size resets the current
/// page to 1, since the user's position in the previous result set no longer
/// means anything.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    current_page: u32,
    items_per_page: u32,
    search_term: String,
    status_filter: String,
    sort_field: String,
    sort_direction: SortDirection,
    dependencies: Vec<Value>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            current_page: 1,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            search_term: String::new(),
            status_filter: ALL_STATUSES.to_string(),
            sort_field: DEFAULT_SORT_FIELD.to_string(),
            sort_direction: SortDirection::Desc,
            dependencies: Vec::new(),
        }
    }
}

impl QueryState {
    /// Creates a state sorted by `sort_field` in `sort_direction`.
    pub fn new(sort_field: impl Into<String>, sort_direction: SortDirection) -> Self {
        Self {
            sort_field: sort_field.into(),
            sort_direction,
            ..Self::default()
        }
    }

    /// Sets the initial page size.
    pub fn with_items_per_page(mut self, items_per_page: u32) -> Self {
        self.items_per_page = items_per_page.max(1);
        self
    }

    /// Sets the initial status filter. An empty filter means [`ALL_STATUSES`].
    pub fn with_status_filter(mut self, status_filter: impl Into<String>) -> Self {
        self.status_filter = normalize_status_filter(status_filter);
        self
    }

    /// Sets the initial dependency list. The first value is the owner id.
    pub fn with_dependencies(mut self, dependencies: Vec<Value>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn status_filter(&self) -> &str {
        &self.status_filter
    }

    pub fn sort_field(&self) -> &str {
        &self.sort_field
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn dependencies(&self) -> &[Value] {
        &self.dependencies
    }

    /// The owning entity id, taken from the first dependency.
    pub fn owner_id(&self) -> Option<String> {
        self.dependencies.first().and_then(owner_id_from_value)
    }

    /// Moves to `page` (clamped to at least 1).
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if self.current_page == page {
            return false;
        }
        self.current_page = page;
        true
    }

    /// Changes the page size, resetting to page 1 when it differs.
    pub fn set_items_per_page(&mut self, items_per_page: u32) -> bool {
        let items_per_page = items_per_page.max(1);
        if self.items_per_page == items_per_page {
            return false;
        }
        self.items_per_page = items_per_page;
        self.current_page = 1;
        true
    }

    /// Changes the search term, resetting to page 1 when it differs.
    pub fn set_search_term(&mut self, search_term: impl Into<String>) -> bool {
        let search_term = search_term.into();
        if self.search_term == search_term {
            return false;
        }
        self.search_term = search_term;
        self.current_page = 1;
        true
    }

    /// Changes the status filter, resetting to page 1 when it differs.
    ///
    /// An empty filter is stored as [`ALL_STATUSES`].
    pub fn set_status_filter(&mut self, status_filter: impl Into<String>) -> bool {
        let status_filter = normalize_status_filter(status_filter);
        if self.status_filter == status_filter {
            return false;
        }
        self.status_filter = status_filter;
        self.current_page = 1;
        true
    }

    /// Sorts by `field`.
    ///
    /// Sorting by the current field toggles the direction; a new field starts
    /// ascending. Returns the resulting direction.
    pub fn sort_by(&mut self, field: impl Into<String>) -> SortDirection {
        let field = field.into();
        if self.sort_field == field {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_field = field;
            self.sort_direction = SortDirection::Asc;
        }
        self.sort_direction
    }

    /// Replaces the dependency list. Returns true when it changed.
    pub fn set_dependencies(&mut self, dependencies: Vec<Value>) -> bool {
        if self.dependencies == dependencies {
            return false;
        }
        self.dependencies = dependencies;
        true
    }

    /// Derives the cache key for the current state.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(
            self.current_page,
            self.items_per_page,
            self.search_term.clone(),
            self.status_filter.clone(),
            self.sort_field.clone(),
            self.sort_direction,
            self.owner_id(),
        )
    }

    /// Derives the fetcher parameters for the current state.
    ///
    /// An empty search term and the "all" status sentinel are omitted.
    pub fn fetch_params(&self) -> FetchParams {
        let extra: BTreeMap<String, Value> = self
            .dependencies
            .iter()
            .enumerate()
            .skip(1)
            .map(|(position, value)| (dependency_key(position), value.clone()))
            .collect();

        FetchParams {
            page: self.current_page,
            limit: self.items_per_page,
            search_term: Some(self.search_term.clone()).filter(|s| !s.is_empty()),
            status_filter: Some(self.status_filter.clone())
                .filter(|s| !s.is_empty() && s != ALL_STATUSES),
            sort_field: self.sort_field.clone(),
            sort_direction: self.sort_direction,
            owner_id: self.owner_id(),
            extra,
        }
    }
}

/// Interprets a dependency value as an owner id.
///
/// Strings are used as-is, numbers and booleans by their textual form, and
/// null or empty strings mean "no owner".
pub fn owner_id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let state = QueryState::default();
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.items_per_page(), 10);
        assert_eq!(state.search_term(), "");
        assert_eq!(state.status_filter(), ALL_STATUSES);
        assert_eq!(state.owner_id(), None);
    }

    #[test]
    fn test_search_resets_page() {
        let mut state = QueryState::default();
        state.set_page(5);

        assert!(state.set_search_term("foo"));
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn test_same_search_keeps_page() {
        let mut state = QueryState::default();
        state.set_search_term("foo");
        state.set_page(3);

        assert!(!state.set_search_term("foo"));
        assert_eq!(state.current_page(), 3);
    }

    #[test]
    fn test_status_filter_resets_page() {
        let mut state = QueryState::default();
        state.set_page(4);

        assert!(state.set_status_filter("active"));
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.status_filter(), "active");
    }

    #[test]
    fn test_empty_status_filter_is_all() {
        let mut state = QueryState::default().with_status_filter("");
        assert_eq!(state.status_filter(), ALL_STATUSES);

        state.set_page(3);
        assert!(!state.set_status_filter(""));
        assert_eq!(state.current_page(), 3);

        let mut all = QueryState::default().with_status_filter(ALL_STATUSES);
        all.set_page(3);
        assert_eq!(state.cache_key(), all.cache_key());
    }

    #[test]
    fn test_items_per_page_resets_page() {
        let mut state = QueryState::default();
        state.set_page(4);

        assert!(state.set_items_per_page(20));
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.items_per_page(), 20);
    }

    #[test]
    fn test_page_is_clamped() {
        let mut state = QueryState::default();
        state.set_page(3);
        assert!(state.set_page(0));
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn test_sort_toggle_and_reset() {
        let mut state = QueryState::new("name", SortDirection::Asc);

        assert_eq!(state.sort_by("name"), SortDirection::Desc);
        assert_eq!(state.sort_by("name"), SortDirection::Asc);
        assert_eq!(state.sort_by("name"), SortDirection::Desc);

        assert_eq!(state.sort_by("price"), SortDirection::Asc);
        assert_eq!(state.sort_field(), "price");
    }

    #[test]
    fn test_owner_from_first_dependency() {
        let state = QueryState::default().with_dependencies(vec![json!("form-1"), json!(7)]);
        assert_eq!(state.owner_id(), Some("form-1".to_string()));

        let numeric = QueryState::default().with_dependencies(vec![json!(42)]);
        assert_eq!(numeric.owner_id(), Some("42".to_string()));

        let null = QueryState::default().with_dependencies(vec![Value::Null]);
        assert_eq!(null.owner_id(), None);
    }

    #[test]
    fn test_set_dependencies_reports_change() {
        let mut state = QueryState::default().with_dependencies(vec![json!("a")]);
        assert!(!state.set_dependencies(vec![json!("a")]));
        assert!(state.set_dependencies(vec![json!("b")]));
        assert_eq!(state.owner_id(), Some("b".to_string()));
    }

    #[test]
    fn test_key_independent_of_mutation_order() {
        let mut a = QueryState::default();
        a.set_search_term("foo");
        a.set_status_filter("active");
        a.sort_by("name");
        a.set_page(2);

        let mut b = QueryState::default();
        b.sort_by("name");
        b.set_status_filter("active");
        b.set_search_term("foo");
        b.set_page(2);

        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_key_tracks_every_field() {
        let base = QueryState::default().with_dependencies(vec![json!("form-1")]);
        let key = base.cache_key();

        let mut page = base.clone();
        page.set_page(2);
        assert_ne!(page.cache_key(), key);

        let mut limit = base.clone();
        limit.set_items_per_page(20);
        assert_ne!(limit.cache_key(), key);

        let mut search = base.clone();
        search.set_search_term("x");
        assert_ne!(search.cache_key(), key);

        let mut status = base.clone();
        status.set_status_filter("draft");
        assert_ne!(status.cache_key(), key);

        let mut sort = base.clone();
        sort.sort_by("created_at");
        assert_ne!(sort.cache_key(), key);

        let mut owner = base.clone();
        owner.set_dependencies(vec![json!("form-2")]);
        assert_ne!(owner.cache_key(), key);
    }

    #[test]
    fn test_fetch_params_omit_defaults() {
        let state = QueryState::default().with_dependencies(vec![json!("form-1")]);
        let params = state.fetch_params();

        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 10);
        assert_eq!(params.search_term, None);
        assert_eq!(params.status_filter, None);
        assert_eq!(params.owner_id, Some("form-1".to_string()));
        assert!(params.extra.is_empty());
    }

    #[test]
    fn test_fetch_params_forward_filters_and_dependencies() {
        let mut state = QueryState::new("name", SortDirection::Asc)
            .with_dependencies(vec![json!("form-1"), json!("published"), json!(3)]);
        state.set_search_term("foo");
        state.set_status_filter("active");

        let params = state.fetch_params();
        assert_eq!(params.search_term.as_deref(), Some("foo"));
        assert_eq!(params.status_filter.as_deref(), Some("active"));
        assert_eq!(params.sort_field, "name");
        assert_eq!(params.dependency(1), Some(&json!("published")));
        assert_eq!(params.dependency(2), Some(&json!(3)));
    }
}
