//! Parameters handed to a fetcher for one page request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SortDirection;

/// Prefix of the positional keys carrying extra dependency values.
pub const DEPENDENCY_KEY_PREFIX: &str = "dep";

/// Request parameters derived from the current query state.
///
/// Optional filters are omitted when they do not narrow the result set.
/// Dependency values after the owner are forwarded verbatim under `dep1`,
/// `dep2`, and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchParams {
    pub page: u32,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_filter: Option<String>,
    pub sort_field: String,
    pub sort_direction: SortDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FetchParams {
    /// Returns an extra dependency by its position in the dependency list.
    ///
    /// Position 0 is the owner and is never stored here.
    pub fn dependency(&self, position: usize) -> Option<&Value> {
        self.extra.get(&dependency_key(position))
    }

    /// Flattens the parameters into string pairs for a query string.
    ///
    /// Non-string dependency values are rendered as JSON.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(search_term) = &self.search_term {
            pairs.push(("searchTerm".to_string(), search_term.clone()));
        }
        if let Some(status_filter) = &self.status_filter {
            pairs.push(("statusFilter".to_string(), status_filter.clone()));
        }
        pairs.push(("sortField".to_string(), self.sort_field.clone()));
        pairs.push((
            "sortDirection".to_string(),
            self.sort_direction.to_string(),
        ));
        if let Some(owner_id) = &self.owner_id {
            pairs.push(("ownerId".to_string(), owner_id.clone()));
        }
        for (key, value) in &self.extra {
            match value {
                Value::Null => {}
                Value::String(s) => pairs.push((key.clone(), s.clone())),
                other => pairs.push((key.clone(), other.to_string())),
            }
        }
        pairs
    }
}

/// Key under which the dependency at `position` is forwarded.
pub fn dependency_key(position: usize) -> String {
    format!("{DEPENDENCY_KEY_PREFIX}{position}")
}
