//! Cache keys derived from a binding plus live state.

use std::collections::BTreeMap;

use crate::binding::{QueryConfig, SortDirection, TableBinding};
use crate::compile::resolve_sort;
use crate::state::TableState;

/// The minimal tuple of inputs that fully determines a query's result, used
/// for caching and in-flight de-duplication. Bindings that differ only in
/// presentation fields (column overrides, display names) derive equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    table: String,
    page: u32,
    sort_column: Option<String>,
    sort_direction: Option<SortDirection>,
    search: Option<String>,
    filters: String,
}

impl QueryKey {
    pub fn derive(binding: &TableBinding, state: &TableState) -> Self {
        let (sort_column, sort_direction) = match resolve_sort(binding, state) {
            Some((column, direction)) => (Some(column), Some(direction)),
            None => (None, None),
        };
        let filters: BTreeMap<&str, serde_json::Value> = state
            .active_filters()
            .map(|(id, value)| (id, value.to_json()))
            .collect();
        Self {
            table: table_identity(binding),
            page: state.page,
            sort_column,
            sort_direction,
            search: state.active_search().map(str::to_string),
            filters: serde_json::to_string(&filters).unwrap_or_default(),
        }
    }

    /// Whether this is the key a server-rendered initial payload answers:
    /// page zero with no live sort, search, or filters.
    pub fn is_default_for(binding: &TableBinding, key: &QueryKey) -> bool {
        *key == QueryKey::derive(binding, &TableState::default())
    }
}

/// The data-source identity component of the key, mirroring protocol
/// precedence: RPC table, then the precomputed/legacy URL, then the simple
/// fallback table.
fn table_identity(binding: &TableBinding) -> String {
    if let Some(config) = binding.rpc_config()
        && config.use_rpc
    {
        return config.table_name.clone();
    }
    if let Some(request) = &binding.data_request {
        if let Some(url) = &request.url {
            return url.clone();
        }
        if let Some(QueryConfig::Legacy(config)) = request.query_config.as_ref() {
            return config.base_url.clone();
        }
    }
    binding.table_name.clone().unwrap_or_default()
}
