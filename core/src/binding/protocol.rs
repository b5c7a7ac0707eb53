//! Protocol descriptor for a binding's data source.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::SortDirection;

/// Where and how a binding fetches its rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub method: HttpMethod,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_config: Option<QueryConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

/// Exactly one of two query dialects. A persisted config carrying `tableName`
/// is the RPC shape; one carrying `baseUrl` is the legacy query-string shape.
/// A request mixing both is unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryConfig {
    Rpc(RpcConfig),
    Legacy(LegacyConfig),
}

impl QueryConfig {
    pub fn as_rpc(&self) -> Option<&RpcConfig> {
        match self {
            QueryConfig::Rpc(config) => Some(config),
            QueryConfig::Legacy(_) => None,
        }
    }

    pub fn as_legacy(&self) -> Option<&LegacyConfig> {
        match self {
            QueryConfig::Legacy(config) => Some(config),
            QueryConfig::Rpc(_) => None,
        }
    }
}

/// Structured-body dialect: the whole query is POSTed to a named procedure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcConfig {
    /// RPC mode is only entered when this is explicitly `true`.
    #[serde(default)]
    pub use_rpc: bool,
    pub table_name: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub joins: Vec<JoinSpec>,
    /// Columns a search targets. Empty means the server auto-detects.
    #[serde(default)]
    pub search_columns: Vec<String>,
    #[serde(default)]
    pub sort_column: Option<String>,
    #[serde(default)]
    pub sort_direction: Option<SortDirection>,
}

/// Query-string dialect: operators are encoded as URL parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyConfig {
    pub base_url: String,
    #[serde(default)]
    pub select_param: Option<String>,
    #[serde(default)]
    pub sort_column: Option<String>,
    #[serde(default)]
    pub sort_direction: Option<SortDirection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JoinSpec {
    pub table: String,
    pub on: String,
    pub kind: JoinKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    Inner,
    #[default]
    Left,
    Right,
    Full,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rpc_shape_deserializes() {
        let config: QueryConfig = serde_json::from_value(serde_json::json!({
            "useRpc": true,
            "tableName": "orders",
            "columns": ["id", "status"],
            "searchColumns": ["status"]
        }))
        .unwrap();
        let rpc = config.as_rpc().unwrap();
        assert!(rpc.use_rpc);
        assert_eq!(rpc.table_name, "orders");
        assert_eq!(rpc.search_columns, vec!["status"]);
    }

    #[test]
    fn test_legacy_shape_deserializes() {
        let config: QueryConfig = serde_json::from_value(serde_json::json!({
            "baseUrl": "/rest/v1/orders",
            "selectParam": "id,status,customers(name)",
            "sortColumn": "id",
            "sortDirection": "desc"
        }))
        .unwrap();
        let legacy = config.as_legacy().unwrap();
        assert_eq!(legacy.base_url, "/rest/v1/orders");
        assert_eq!(legacy.sort_direction, Some(SortDirection::Desc));
    }
}
