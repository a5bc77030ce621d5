use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::SortDirection;

/// Default number of items per page.
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 10;

/// Status filter sentinel meaning "no status filtering".
pub const ALL_STATUSES: &str = "all";

/// Maps an empty status filter to [`ALL_STATUSES`].
///
/// Both mean "no filtering", so they must resolve to the same key.
pub fn normalize_status_filter(status_filter: impl Into<String>) -> String {
    let status_filter = status_filter.into();
    if status_filter.is_empty() {
        ALL_STATUSES.to_string()
    } else {
        status_filter
    }
}

/// Composite key identifying one cached page of a query.
///
/// Equality is structural: two keys built from the same parameters are equal
/// regardless of how they were constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub page: u32,
    pub items_per_page: u32,
    pub search_term: String,
    pub status_filter: String,
    pub sort_field: String,
    pub sort_direction: SortDirection,
    pub owner_id: Option<String>,
}

impl CacheKey {
    /// Creates a normalized key.
    ///
    /// `page` and `items_per_page` are clamped to at least 1, an empty status
    /// filter becomes [`ALL_STATUSES`], and an empty owner id is treated as no
    /// owner.
    pub fn new(
        page: u32,
        items_per_page: u32,
        search_term: impl Into<String>,
        status_filter: impl Into<String>,
        sort_field: impl Into<String>,
        sort_direction: SortDirection,
        owner_id: Option<String>,
    ) -> Self {
        Self {
            page: page.max(1),
            items_per_page: items_per_page.max(1),
            search_term: search_term.into(),
            status_filter: normalize_status_filter(status_filter),
            sort_field: sort_field.into(),
            sort_direction,
            owner_id: owner_id.filter(|id| !id.is_empty()),
        }
    }

    /// Returns the stable string encoding of this key.
    ///
    /// Fields always appear in the same order, so for normalized keys the
    /// encoding is equal iff the keys are equal.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagedquery_core::cache::CacheKey;
    /// use pagedquery_core::query::SortDirection;
    ///
    /// let key = CacheKey::new(2, 10, "", "all", "name", SortDirection::Asc, Some("form-1".into()));
    /// assert_eq!(
    ///     key.canonical(),
    ///     "page=2&limit=10&search=&status=all&sort=name&dir=asc&owner=form-1"
    /// );
    /// ```
    pub fn canonical(&self) -> String {
        let owner = self.owner_id.as_deref().map(escape_component).unwrap_or_default();
        format!(
            "page={}&limit={}&search={}&status={}&sort={}&dir={}&owner={}",
            self.page,
            self.items_per_page,
            escape_component(&self.search_term),
            escape_component(&self.status_filter),
            escape_component(&self.sort_field),
            self.sort_direction,
            owner,
        )
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Escapes separator characters so user text cannot collide with field boundaries.
fn escape_component(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '&' => escaped.push_str("%26"),
            '=' => escaped.push_str("%3D"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(page: u32) -> CacheKey {
        CacheKey::new(
            page,
            DEFAULT_ITEMS_PER_PAGE,
            "",
            ALL_STATUSES,
            "created_at",
            SortDirection::Desc,
            Some("form-1".to_string()),
        )
    }

    #[test]
    fn test_structural_equality() {
        let a = key(1);
        let b = CacheKey {
            owner_id: Some("form-1".to_string()),
            sort_direction: SortDirection::Desc,
            sort_field: "created_at".to_string(),
            status_filter: ALL_STATUSES.to_string(),
            search_term: String::new(),
            items_per_page: 10,
            page: 1,
        };
        assert_eq!(a, b);
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn test_single_field_difference_is_unequal() {
        let base = key(1);

        let variants = vec![
            CacheKey {
                page: 2,
                ..base.clone()
            },
            CacheKey {
                items_per_page: 20,
                ..base.clone()
            },
            CacheKey {
                search_term: "foo".to_string(),
                ..base.clone()
            },
            CacheKey {
                status_filter: "active".to_string(),
                ..base.clone()
            },
            CacheKey {
                sort_field: "name".to_string(),
                ..base.clone()
            },
            CacheKey {
                sort_direction: SortDirection::Asc,
                ..base.clone()
            },
            CacheKey {
                owner_id: Some("form-2".to_string()),
                ..base.clone()
            },
            CacheKey {
                owner_id: None,
                ..base.clone()
            },
        ];

        for variant in variants {
            assert_ne!(variant, base);
            assert_ne!(variant.canonical(), base.canonical());
        }
    }

    #[test]
    fn test_normalization() {
        let key = CacheKey::new(
            0,
            0,
            "",
            ALL_STATUSES,
            "name",
            SortDirection::Asc,
            Some(String::new()),
        );
        assert_eq!(key.page, 1);
        assert_eq!(key.items_per_page, 1);
        assert_eq!(key.owner_id, None);
    }

    #[test]
    fn test_empty_status_filter_is_all() {
        let empty = CacheKey::new(1, 10, "", "", "name", SortDirection::Asc, None);
        let all = CacheKey::new(1, 10, "", ALL_STATUSES, "name", SortDirection::Asc, None);
        assert_eq!(empty, all);
        assert_eq!(normalize_status_filter("active"), "active");
    }

    #[test]
    fn test_canonical_without_owner() {
        let key = CacheKey::new(1, 10, "", ALL_STATUSES, "name", SortDirection::Asc, None);
        assert_eq!(
            key.canonical(),
            "page=1&limit=10&search=&status=all&sort=name&dir=asc&owner="
        );
    }

    #[test]
    fn test_canonical_escapes_separators() {
        let tricky = CacheKey::new(
            1,
            10,
            "a&status=x",
            ALL_STATUSES,
            "name",
            SortDirection::Asc,
            None,
        );
        let plain = CacheKey::new(1, 10, "a", "x", "name", SortDirection::Asc, None);
        assert_ne!(tricky.canonical(), plain.canonical());
        assert!(tricky.canonical().contains("search=a%26status%3Dx"));
    }
}
