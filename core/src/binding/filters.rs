//! Filter configuration and runtime filter values.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::protocol::DataRequest;

/// One user-facing filter control on a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterConfig {
    pub id: String,
    /// Target attribute. May contain `.` for relation paths.
    pub column: String,
    pub filter_type: FilterType,
    /// Static option list, when the builder authored one.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FilterOption>,
    /// Dynamic option source. Dropdown/multiselect filters with one of these
    /// get their options resolved against the live data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options_request: Option<DataRequest>,
}

impl FilterConfig {
    /// Whether this filter's option list is fetched rather than authored.
    pub fn has_dynamic_options(&self) -> bool {
        self.filter_type.selects_from_options() && self.options_request.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterType {
    #[default]
    Text,
    Dropdown,
    Multiselect,
    Number,
    Boolean,
    DateRange,
}

impl FilterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::Text => "text",
            FilterType::Dropdown => "dropdown",
            FilterType::Multiselect => "multiselect",
            FilterType::Number => "number",
            FilterType::Boolean => "boolean",
            FilterType::DateRange => "dateRange",
        }
    }

    /// Dropdown-style types pick from a candidate option list.
    pub fn selects_from_options(&self) -> bool {
        matches!(self, FilterType::Dropdown | FilterType::Multiselect)
    }
}

impl std::fmt::Display for FilterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A live filter value, tagged by control type so compilation can match
/// exhaustively instead of sniffing a dynamic value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum FilterValue {
    Text(String),
    Dropdown(String),
    Multiselect(Vec<String>),
    Number(f64),
    #[serde(rename_all = "camelCase")]
    NumberRange {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Boolean(bool),
    #[serde(rename_all = "camelCase")]
    DateRange {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_days: Option<u32>,
    },
}

impl FilterValue {
    /// An inactive value compiles to nothing: empty text, an empty selection,
    /// a range with no bounds.
    pub fn is_active(&self) -> bool {
        match self {
            FilterValue::Text(s) | FilterValue::Dropdown(s) => !s.is_empty(),
            FilterValue::Multiselect(values) => !values.is_empty(),
            FilterValue::Number(_) | FilterValue::Boolean(_) => true,
            FilterValue::NumberRange { min, max } => min.is_some() || max.is_some(),
            FilterValue::DateRange { last_days } => last_days.is_some(),
        }
    }

    /// The raw wire value the RPC dialect carries for this filter.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FilterValue::Text(s) | FilterValue::Dropdown(s) => json!(s),
            FilterValue::Multiselect(values) => json!(values),
            FilterValue::Number(n) => json!(n),
            FilterValue::NumberRange { min, max } => {
                let mut range = serde_json::Map::new();
                if let Some(min) = min {
                    range.insert("min".into(), json!(min));
                }
                if let Some(max) = max {
                    range.insert("max".into(), json!(max));
                }
                serde_json::Value::Object(range)
            }
            FilterValue::Boolean(b) => json!(b),
            FilterValue::DateRange { last_days } => json!({ "lastDays": last_days }),
        }
    }
}

/// A candidate entry in a dropdown/multiselect option list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
}

impl FilterOption {
    /// No separate human label exists at this layer: the value doubles as it.
    pub fn from_value(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}
