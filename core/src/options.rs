//! Cascading filter-option compilation and normalization.
//!
//! Dropdown and multiselect filters with a dynamic source get their candidate
//! lists from the live data, narrowed by the *other* active filters and the
//! current search. The async dispatch half lives in the client crate; this
//! module is the pure compilation half.

use serde_json::Value;

use crate::binding::{FilterConfig, FilterOption, QueryConfig, TableBinding};
use crate::compile::rpc_filters;
use crate::request::{QueryRequest, RPC_DISTINCT_VALUES, RpcBody};
use crate::state::TableState;

/// Compile the distinct-values request for one filter.
///
/// The cascading context carries every *other* active filter; the filter
/// itself is excluded so a selected value cannot filter itself out of its own
/// candidate list. An active search is folded in so option lists reflect the
/// current search scope. Returns `None` for filters with no dynamic source.
pub fn options_request(
    binding: &TableBinding,
    filter: &FilterConfig,
    state: &TableState,
) -> Option<QueryRequest> {
    if !filter.filter_type.selects_from_options() {
        return None;
    }
    let source = filter.options_request.as_ref()?;
    let table_name = source
        .query_config
        .as_ref()
        .and_then(QueryConfig::as_rpc)
        .map(|config| config.table_name.clone())
        .or_else(|| binding.primary_table().map(str::to_string))?;

    let mut body = RpcBody {
        table_name,
        column: Some(filter.column.clone()),
        filters: rpc_filters(binding, state, Some(filter.column.as_str())),
        ..Default::default()
    };
    if let Some(search) = state.active_search() {
        body.search_query = Some(search.to_string());
        let explicit = binding
            .rpc_config()
            .map(|config| config.search_columns.clone())
            .unwrap_or_default();
        body.search_cols = Some(if explicit.is_empty() {
            binding
                .searchable_columns()
                .into_iter()
                .map(str::to_string)
                .collect()
        } else {
            explicit
        });
    }

    let url = source
        .url
        .clone()
        .unwrap_or_else(|| format!("/api/rpc/{RPC_DISTINCT_VALUES}"));
    Some(QueryRequest::Rpc { url, body })
}

/// Normalize raw distinct-value rows into label/value pairs.
///
/// Each row is either a scalar or a single-key wrapper object (the usual
/// shape of aggregation results); the wrapped value is unwrapped and
/// stringified. No separate human label exists at this layer, so the string
/// serves as both label and value.
pub fn normalize_options(rows: &[Value]) -> Vec<FilterOption> {
    rows.iter()
        .filter_map(|row| {
            let value = match row {
                Value::Object(map) => map.values().next()?,
                other => other,
            };
            match value {
                Value::Null => None,
                Value::String(s) if s.is_empty() => None,
                Value::String(s) => Some(FilterOption::from_value(s.clone())),
                other => Some(FilterOption::from_value(other.to_string())),
            }
        })
        .collect()
}

/// The dependency set whose change should trigger an option-list refetch:
/// the serialized sibling-filter values plus the search string. Unrelated
/// binding changes (column overrides, display names) do not move it.
pub fn dependency_signature(
    binding: &TableBinding,
    filter: &FilterConfig,
    state: &TableState,
) -> String {
    let siblings: Vec<(String, Value)> =
        rpc_filters(binding, state, Some(filter.column.as_str()))
            .into_iter()
            .map(|entry| (entry.column, entry.value))
            .collect();
    serde_json::to_string(&serde_json::json!({
        "filters": siblings,
        "search": state.active_search(),
    }))
    .unwrap_or_default()
}
