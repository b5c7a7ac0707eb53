//! Live UI state of a rendered table.
//!
//! Owned by the calling component and passed fresh into every compile call;
//! the core keeps no mutable copy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::binding::{FilterValue, SortDirection};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableState {
    /// Zero-indexed current page.
    pub page: u32,
    pub sort_column: Option<String>,
    pub sort_direction: Option<SortDirection>,
    pub search: Option<String>,
    /// Live filter values keyed by filter id.
    pub filter_values: BTreeMap<String, FilterValue>,
}

impl TableState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_sort(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_column = Some(column.into());
        self.sort_direction = Some(direction);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_filter(mut self, id: impl Into<String>, value: FilterValue) -> Self {
        self.filter_values.insert(id.into(), value);
        self
    }

    /// The search string, if one is actually in effect.
    pub fn active_search(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    /// Filter entries whose values would compile to a predicate, in key order.
    pub fn active_filters(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.filter_values
            .iter()
            .filter(|(_, value)| value.is_active())
            .map(|(id, value)| (id.as_str(), value))
    }
}
