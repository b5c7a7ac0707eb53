//! Legacy query-string dialect.
//!
//! The query is expressed as URL parameters in the `{col}={op}.{value}`
//! grammar, with `select`, `limit`, `offset`, `order` and an `or=(...)`
//! search clause.

use chrono::{Days, Utc};
use url::form_urlencoded::Serializer;

use super::{effective_page_size, resolve_sort};
use crate::binding::{DataRequest, FilterValue, LegacyConfig, TableBinding};
use crate::request::QueryRequest;
use crate::state::TableState;

pub(crate) fn legacy_request(
    binding: &TableBinding,
    state: &TableState,
    data_request: &DataRequest,
    config: Option<&LegacyConfig>,
) -> QueryRequest {
    let base = data_request
        .url
        .clone()
        .or_else(|| config.map(|c| c.base_url.clone()))
        .unwrap_or_default();

    let mut params = Serializer::new(String::new());
    if let Some(select) = config.and_then(|c| c.select_param.as_deref()) {
        params.append_pair("select", select);
    }

    let page_size = effective_page_size(binding);
    params.append_pair("limit", &page_size.to_string());
    // Offsets stay zero-indexed; only the RPC dialect shifts pages by one.
    params.append_pair("offset", &(state.page * page_size).to_string());

    if let Some((column, direction)) = resolve_sort(binding, state) {
        params.append_pair("order", &format!("{column}.{direction}"));
    }

    if binding.filtering.search_enabled
        && let Some(search) = state.active_search()
    {
        let clauses: Vec<String> = binding
            .searchable_columns()
            .iter()
            .map(|column| format!("{column}.ilike.*{search}*"))
            .collect();
        if !clauses.is_empty() {
            params.append_pair("or", &format!("({})", clauses.join(",")));
        }
    }

    for (id, value) in state.active_filters() {
        let column = binding
            .filter(id)
            .map(|config| config.column.clone())
            .unwrap_or_else(|| id.to_string());
        for predicate in predicates(value) {
            params.append_pair(&column, &predicate);
        }
    }

    let query = params.finish();
    let url = if query.is_empty() {
        base
    } else if base.contains('?') {
        format!("{base}&{query}")
    } else {
        format!("{base}?{query}")
    };

    QueryRequest::Legacy {
        url,
        headers: data_request.headers.clone(),
    }
}

/// Operator mapping from a filter value to query-string predicates. A number
/// range can carry both bounds, so one value may emit two parameters.
fn predicates(value: &FilterValue) -> Vec<String> {
    match value {
        FilterValue::Text(s) => vec![format!("ilike.*{s}*")],
        FilterValue::Dropdown(s) => vec![format!("eq.{s}")],
        FilterValue::Multiselect(values) if !values.is_empty() => {
            vec![format!("in.({})", values.join(","))]
        }
        FilterValue::Multiselect(_) => vec![],
        FilterValue::Number(n) => vec![format!("eq.{n}")],
        FilterValue::NumberRange { min, max } => {
            let mut bounds = Vec::new();
            if let Some(min) = min {
                bounds.push(format!("gte.{min}"));
            }
            if let Some(max) = max {
                bounds.push(format!("lte.{max}"));
            }
            bounds
        }
        FilterValue::Boolean(b) => vec![format!("eq.{b}")],
        FilterValue::DateRange { last_days } => match last_days {
            Some(days) => {
                let cutoff = Utc::now().date_naive() - Days::new(u64::from(*days));
                vec![format!("gte.{}", cutoff.format("%Y-%m-%d"))]
            }
            None => vec![],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{FilterConfig, FilterType};
    use crate::compile::compile;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn legacy_binding() -> TableBinding {
        serde_json::from_value(json!({
            "columnOrder": ["id", "name", "countries.country"],
            "pagination": { "enabled": true, "pageSize": 20, "page": 0 },
            "dataRequest": {
                "url": "/rest/v1/people",
                "method": "GET",
                "queryConfig": {
                    "baseUrl": "/rest/v1/people",
                    "selectParam": "id,name,countries(country)"
                }
            }
        }))
        .unwrap()
    }

    fn legacy_url(request: QueryRequest) -> String {
        match request {
            QueryRequest::Legacy { url, .. } => url,
            other => panic!("expected legacy request, got {other:?}"),
        }
    }

    #[test]
    fn test_offset_stays_zero_indexed() {
        let url = legacy_url(compile(&legacy_binding(), &TableState::new().with_page(3)));
        assert!(url.contains("limit=20"), "{url}");
        assert!(url.contains("offset=60"), "{url}");
    }

    #[test]
    fn test_text_filter_compiles_to_ilike() {
        let mut binding = legacy_binding();
        binding.frontend_filters = vec![FilterConfig {
            id: "name".into(),
            column: "name".into(),
            filter_type: FilterType::Text,
            ..Default::default()
        }];
        let state = TableState::new().with_filter("name", FilterValue::Text("abc".into()));
        let url = legacy_url(compile(&binding, &state));
        assert!(url.contains("name=ilike.*abc*"), "{url}");
    }

    #[test]
    fn test_empty_multiselect_emits_nothing() {
        let state = TableState::new().with_filter("tags", FilterValue::Multiselect(vec![]));
        let url = legacy_url(compile(&legacy_binding(), &state));
        assert!(!url.contains("tags"), "{url}");
    }

    #[test]
    fn test_number_range_emits_both_bounds() {
        let bounds = predicates(&FilterValue::NumberRange {
            min: Some(10.0),
            max: Some(99.0),
        });
        assert_eq!(bounds, vec!["gte.10", "lte.99"]);
    }

    #[test]
    fn test_search_clause_skips_relation_columns() {
        let url = legacy_url(compile(&legacy_binding(), &TableState::new().with_search("fr")));
        let decoded: String = url::form_urlencoded::parse(
            url.split_once('?').map(|(_, q)| q).unwrap_or("").as_bytes(),
        )
        .map(|(k, v)| format!("{k}={v}&"))
        .collect();
        assert!(decoded.contains("or=(id.ilike.*fr*,name.ilike.*fr*)"), "{decoded}");
        assert!(!decoded.contains("countries.country.ilike"), "{decoded}");
    }

    #[test]
    fn test_search_disabled_emits_no_or_clause() {
        let mut binding = legacy_binding();
        binding.filtering.search_enabled = false;
        let url = legacy_url(compile(&binding, &TableState::new().with_search("fr")));
        assert!(!url.contains("or="), "{url}");
    }

    #[test]
    fn test_precomputed_url_keeps_existing_query() {
        let mut binding = legacy_binding();
        if let Some(request) = binding.data_request.as_mut() {
            request.url = Some("/rest/v1/people?apikey=anon".into());
            request.query_config = None;
        }
        let url = legacy_url(compile(&binding, &TableState::new()));
        assert!(url.starts_with("/rest/v1/people?apikey=anon&"), "{url}");
    }
}
