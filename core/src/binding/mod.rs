//! Persisted table-binding model.
//!
//! A binding is authored once in the builder UI and read many times at render
//! time. It is pure data: behavior lives in [`crate::compile`] and
//! [`crate::options`]. All types deserialize from the camelCase JSON the
//! builder persists, tolerating missing fields.

mod filters;
mod protocol;

pub use filters::{FilterConfig, FilterOption, FilterType, FilterValue};
pub use protocol::{
    DataRequest, HttpMethod, JoinKind, JoinSpec, LegacyConfig, QueryConfig, RpcConfig,
};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sort direction for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// A persisted description of what data a table shows and how.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableBinding {
    pub table_name: Option<String>,
    pub column_order: Vec<String>,
    pub column_overrides: BTreeMap<String, ColumnOverride>,
    pub pagination: PaginationConfig,
    pub sorting: SortingConfig,
    pub filtering: FilteringConfig,
    pub frontend_filters: Vec<FilterConfig>,
    pub data_request: Option<DataRequest>,
}

/// Per-column display override. A column is visible unless `visible` is
/// explicitly `false`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationConfig {
    pub enabled: bool,
    pub page_size: u32,
    /// Zero-indexed default page.
    pub page: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            page_size: 20,
            page: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SortingConfig {
    pub enabled: bool,
    pub column: Option<String>,
    pub direction: Option<SortDirection>,
}

impl Default for SortingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            column: None,
            direction: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilteringConfig {
    pub search_enabled: bool,
}

impl Default for FilteringConfig {
    fn default() -> Self {
        Self {
            search_enabled: true,
        }
    }
}

impl TableBinding {
    /// The protocol descriptor, if any.
    pub fn query_config(&self) -> Option<&QueryConfig> {
        self.data_request.as_ref()?.query_config.as_ref()
    }

    /// The RPC protocol config, if that shape is configured.
    pub fn rpc_config(&self) -> Option<&RpcConfig> {
        match self.query_config() {
            Some(QueryConfig::Rpc(config)) => Some(config),
            _ => None,
        }
    }

    /// The table this binding reads from, preferring the protocol config.
    pub fn primary_table(&self) -> Option<&str> {
        self.rpc_config()
            .map(|config| config.table_name.as_str())
            .or(self.table_name.as_deref())
    }

    /// Look up a filter config by its id.
    pub fn filter(&self, id: &str) -> Option<&FilterConfig> {
        self.frontend_filters.iter().find(|f| f.id == id)
    }

    /// Columns shown in the table, in display order. Falls back to the RPC
    /// column list when no explicit order was authored.
    pub fn visible_columns(&self) -> Vec<&str> {
        let universe: Vec<&str> = if self.column_order.is_empty() {
            self.rpc_config()
                .map(|config| config.columns.iter().map(String::as_str).collect())
                .unwrap_or_default()
        } else {
            self.column_order.iter().map(String::as_str).collect()
        };
        universe
            .into_iter()
            .filter(|column| {
                self.column_overrides
                    .get(*column)
                    .and_then(|o| o.visible)
                    .unwrap_or(true)
            })
            .collect()
    }

    /// Visible columns a free-text search can target: relation paths (keys
    /// containing `.`) cannot be ilike'd across a join in query-string form.
    pub fn searchable_columns(&self) -> Vec<&str> {
        self.visible_columns()
            .into_iter()
            .filter(|column| !column.contains('.'))
            .collect()
    }
}
