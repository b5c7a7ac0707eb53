//! Compiled query requests.
//!
//! A [`QueryRequest`] describes exactly one HTTP call in one of the two
//! backend dialects. Misconfiguration is a value ([`QueryRequest::Unconfigured`]),
//! not an error: the caller renders an unconfigured state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::binding::{FilterType, JoinSpec, SortDirection};

/// RPC procedure that pages through rows.
pub const RPC_GET_ROWS: &str = "frontbase_get_rows";
/// RPC procedure that searches while paging; substituted for
/// [`RPC_GET_ROWS`] in the configured URL when a search is active.
pub const RPC_SEARCH_ROWS: &str = "frontbase_search_rows";
/// RPC procedure that lists distinct values for a column.
pub const RPC_DISTINCT_VALUES: &str = "frontbase_get_distinct_values";

#[derive(Debug, Clone, PartialEq)]
pub enum QueryRequest {
    /// Structured body POSTed to a named procedure.
    Rpc { url: String, body: RpcBody },
    /// Query-string dialect: everything is encoded in the URL.
    Legacy {
        url: String,
        headers: BTreeMap<String, String>,
    },
    /// Unfiltered, unpaginated fallback endpoint.
    Simple { url: String },
    /// No usable data source was configured.
    Unconfigured,
}

impl QueryRequest {
    pub fn is_unconfigured(&self) -> bool {
        matches!(self, QueryRequest::Unconfigured)
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            QueryRequest::Rpc { url, .. }
            | QueryRequest::Legacy { url, .. }
            | QueryRequest::Simple { url } => Some(url),
            QueryRequest::Unconfigured => None,
        }
    }

    /// The `{dataRequest}` envelope posted to the execute endpoint.
    /// `None` for an unconfigured request, which never reaches the network.
    pub fn as_execute_body(&self) -> Option<serde_json::Value> {
        match self {
            QueryRequest::Rpc { url, body } => Some(json!({
                "dataRequest": {
                    "url": url,
                    "method": "POST",
                    "body": serde_json::to_value(body).unwrap_or_default(),
                }
            })),
            QueryRequest::Legacy { url, headers } => Some(json!({
                "dataRequest": {
                    "url": url,
                    "method": "GET",
                    "headers": headers,
                }
            })),
            QueryRequest::Simple { url } => Some(json!({
                "dataRequest": { "url": url, "method": "GET" }
            })),
            QueryRequest::Unconfigured => None,
        }
    }
}

/// Body for the `frontbase_*` RPC family. Optional fields are omitted from
/// the wire, so one shape serves row fetches, searches, and distinct-value
/// lookups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcBody {
    pub table_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<JoinSpec>,
    /// Target column for distinct-value lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// One-indexed page. The zero-indexed UI page shifts by one exactly once,
    /// in the compiler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_col: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_dir: Option<SortDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    /// Present only while searching. Empty means the server auto-detects
    /// text columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_cols: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<RpcFilter>,
}

/// One active filter in an RPC body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcFilter {
    pub column: String,
    pub filter_type: FilterType,
    pub value: serde_json::Value,
}
