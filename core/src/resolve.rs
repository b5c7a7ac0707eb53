//! Response parsing and cell-value extraction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{QueryError, QueryResult};

/// Parsed rows plus the best-effort total row count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub rows: Vec<Value>,
    pub total: u64,
}

/// Parse a raw execute-endpoint response into rows and a total.
///
/// Tolerates both wrapped (`data.rows`/`data.total`) and bare-array server
/// shapes. A missing total degrades to the row count rather than failing the
/// fetch. `success: false` surfaces as [`QueryError::Envelope`].
pub fn parse_response(raw: &Value) -> QueryResult<TableData> {
    if raw.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(QueryError::Envelope(envelope_message(raw)));
    }
    let data = raw.get("data").unwrap_or(raw);
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .or_else(|| data.as_array())
        .cloned()
        .unwrap_or_default();
    let total = data
        .get("total")
        .and_then(Value::as_u64)
        .or_else(|| raw.get("total").and_then(Value::as_u64))
        .unwrap_or(rows.len() as u64);
    Ok(TableData { rows, total })
}

fn envelope_message(raw: &Value) -> String {
    raw.get("data")
        .and_then(|data| data.get("error"))
        .and_then(Value::as_str)
        .or_else(|| raw.get("error").and_then(Value::as_str))
        .or_else(|| raw.get("message").and_then(Value::as_str))
        .unwrap_or("request failed")
        .to_string()
}

/// Extract a column's value from a row of unknown shape.
///
/// The same logical column arrives differently depending on whether the
/// backend produced a join embedding or a flat projection, so lookup falls
/// through three shapes:
///
/// 1. direct key (flat or aliased results),
/// 2. dotted-path walk (embedded relations),
/// 3. the last path segment as a flat key (servers that flatten
///    `table.column` down to `column`).
pub fn cell_value<'a>(row: &'a Value, column_key: &str) -> Option<&'a Value> {
    if let Some(value) = row.get(column_key) {
        return Some(value);
    }
    if column_key.contains('.') {
        let mut current = row;
        let mut walked = true;
        for segment in column_key.split('.') {
            match current.get(segment) {
                Some(next) => current = next,
                None => {
                    walked = false;
                    break;
                }
            }
        }
        if walked {
            return Some(current);
        }
        if let Some(last) = column_key.rsplit('.').next()
            && let Some(value) = row.get(last)
        {
            return Some(value);
        }
    }
    None
}
