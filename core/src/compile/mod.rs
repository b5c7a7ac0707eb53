//! Query compiler: `(binding, state) -> QueryRequest`.
//!
//! Pure and total. Protocol selection is evaluated in order, first match
//! wins: explicit RPC config, then a precomputed legacy URL, then the simple
//! per-table fallback endpoint, then [`QueryRequest::Unconfigured`].

mod legacy;

use crate::binding::{FilterType, QueryConfig, RpcConfig, SortDirection, TableBinding};
use crate::request::{QueryRequest, RPC_GET_ROWS, RPC_SEARCH_ROWS, RpcBody, RpcFilter};
use crate::state::TableState;

pub fn compile(binding: &TableBinding, state: &TableState) -> QueryRequest {
    if let Some(config) = binding.rpc_config()
        && config.use_rpc
    {
        return rpc_request(binding, state, config);
    }
    if let Some(data_request) = &binding.data_request {
        let legacy_config = data_request
            .query_config
            .as_ref()
            .and_then(QueryConfig::as_legacy);
        if data_request.url.is_some() || legacy_config.is_some() {
            return legacy::legacy_request(binding, state, data_request, legacy_config);
        }
    }
    if let Some(table) = binding.table_name.as_deref()
        && !table.is_empty()
    {
        return QueryRequest::Simple {
            url: format!("/api/data/{table}"),
        };
    }
    QueryRequest::Unconfigured
}

fn rpc_request(binding: &TableBinding, state: &TableState, config: &RpcConfig) -> QueryRequest {
    let url = binding
        .data_request
        .as_ref()
        .and_then(|request| request.url.clone())
        .unwrap_or_else(|| format!("/api/rpc/{RPC_GET_ROWS}"));

    let mut body = RpcBody {
        table_name: config.table_name.clone(),
        columns: config.columns.clone(),
        joins: config.joins.clone(),
        page: Some(state.page + 1),
        page_size: Some(effective_page_size(binding)),
        filters: rpc_filters(binding, state, None),
        ..Default::default()
    };

    if let Some(search) = state.active_search() {
        // Searching switches procedures and suppresses the sort: the search
        // RPC owns result ordering.
        body.search_query = Some(search.to_string());
        body.search_cols = Some(config.search_columns.clone());
        QueryRequest::Rpc {
            url: url.replace(RPC_GET_ROWS, RPC_SEARCH_ROWS),
            body,
        }
    } else {
        if let Some((column, direction)) = resolve_sort(binding, state) {
            body.sort_col = Some(column);
            body.sort_dir = Some(direction);
        }
        QueryRequest::Rpc { url, body }
    }
}

/// Live state wins over the authored binding sort, which wins over the
/// protocol config's default. Direction falls back to ascending.
pub(crate) fn resolve_sort(
    binding: &TableBinding,
    state: &TableState,
) -> Option<(String, SortDirection)> {
    let (config_column, config_direction) = match binding.query_config() {
        Some(QueryConfig::Rpc(config)) => (config.sort_column.as_ref(), config.sort_direction),
        Some(QueryConfig::Legacy(config)) => (config.sort_column.as_ref(), config.sort_direction),
        None => (None, None),
    };
    let column = state
        .sort_column
        .clone()
        .or_else(|| binding.sorting.column.clone())
        .or_else(|| config_column.cloned())?;
    let direction = state
        .sort_direction
        .or(binding.sorting.direction)
        .or(config_direction)
        .unwrap_or_default();
    Some((column, direction))
}

pub(crate) fn effective_page_size(binding: &TableBinding) -> u32 {
    match binding.pagination.page_size {
        0 => 20,
        size => size,
    }
}

/// Active filter values as RPC filter entries. The filter type comes from
/// the matching config, falling back to text for values with no config.
/// `exclude_column` drops one column from the set, the cascading-options
/// self-exclusion.
pub(crate) fn rpc_filters(
    binding: &TableBinding,
    state: &TableState,
    exclude_column: Option<&str>,
) -> Vec<RpcFilter> {
    state
        .active_filters()
        .filter_map(|(id, value)| {
            let (column, filter_type) = match binding.filter(id) {
                Some(config) => (config.column.clone(), config.filter_type),
                None => (id.to_string(), FilterType::Text),
            };
            if exclude_column == Some(column.as_str()) {
                return None;
            }
            Some(RpcFilter {
                column,
                filter_type,
                value: value.to_json(),
            })
        })
        .collect()
}
