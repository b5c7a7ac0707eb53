//! Cascading filter-options resolution.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use gridq_core::binding::{FilterOption, TableBinding};
use gridq_core::error::QueryError;
use gridq_core::options::{dependency_signature, normalize_options, options_request};
use gridq_core::request::QueryRequest;
use gridq_core::resolve::parse_response;
use gridq_core::state::TableState;

use crate::transport::Transport;

/// Resolves per-filter option lists, re-fetching a filter only when its
/// dependency set (sibling filter values, search) has moved.
pub struct OptionsResolver {
    transport: Arc<dyn Transport>,
    resolved: DashMap<String, ResolvedOptions>,
}

struct ResolvedOptions {
    signature: String,
    options: Vec<FilterOption>,
}

impl OptionsResolver {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            resolved: DashMap::new(),
        }
    }

    /// Resolve option lists for every filter with a dynamic source, keyed by
    /// filter id.
    ///
    /// Fetches run fully concurrently and are isolated: a failing filter
    /// logs and resolves to an empty list without blocking its siblings or
    /// corrupting anything previously resolved.
    pub async fn resolve(
        &self,
        binding: &TableBinding,
        state: &TableState,
    ) -> BTreeMap<String, Vec<FilterOption>> {
        let mut lists = BTreeMap::new();
        let mut fetches = Vec::new();
        for filter in &binding.frontend_filters {
            let Some(request) = options_request(binding, filter, state) else {
                continue;
            };
            let signature = dependency_signature(binding, filter, state);
            if let Some(cached) = self.resolved.get(&filter.id)
                && cached.signature == signature
            {
                lists.insert(filter.id.clone(), cached.options.clone());
                continue;
            }
            fetches.push(self.fetch_options(filter.id.clone(), request, signature));
        }
        for (id, options) in futures::future::join_all(fetches).await {
            lists.insert(id, options);
        }
        lists
    }

    /// Forget everything previously resolved, forcing full refetches.
    pub fn clear(&self) {
        self.resolved.clear();
    }

    async fn fetch_options(
        &self,
        id: String,
        request: QueryRequest,
        signature: String,
    ) -> (String, Vec<FilterOption>) {
        let outcome = match self.transport.execute(request).await {
            Ok(raw) => parse_response(&raw),
            Err(err) => Err(QueryError::from(err)),
        };
        match outcome {
            Ok(data) => {
                let options = normalize_options(&data.rows);
                self.resolved.insert(
                    id.clone(),
                    ResolvedOptions {
                        signature,
                        options: options.clone(),
                    },
                );
                (id, options)
            }
            Err(err) => {
                // Isolated failure: siblings and any previously resolved
                // list for this filter are left as they were.
                tracing::warn!("options fetch for filter '{}' failed: {}", id, err);
                (id, Vec::new())
            }
        }
    }
}
