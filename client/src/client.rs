//! Cached table client: compile, de-duplicate, dispatch, parse.
//!
//! One flow serves every call site: the server-render seed, the hydrated
//! client table, and admin data views all go through [`TableClient::fetch`],
//! so a query behaves identically wherever it is issued from.

use std::sync::Arc;

use futures::FutureExt;
use gridq_core::binding::TableBinding;
use gridq_core::compile::compile;
use gridq_core::error::{QueryError, QueryResult};
use gridq_core::key::QueryKey;
use gridq_core::resolve::{TableData, parse_response};
use gridq_core::state::TableState;

use crate::cache::{CacheConfig, CacheStats, QueryCache};
use crate::transport::Transport;

pub struct TableClient {
    transport: Arc<dyn Transport>,
    cache: QueryCache,
}

impl TableClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::builder().build(transport)
    }

    pub fn builder() -> TableClientBuilder {
        TableClientBuilder::default()
    }

    /// Fetch rows for a binding under the given live state.
    ///
    /// A fresh cached outcome is served without a network attempt, and a
    /// request already in flight for the same key is joined rather than
    /// duplicated. An unconfigured binding resolves immediately, touching
    /// neither cache nor transport.
    pub async fn fetch(
        &self,
        binding: &TableBinding,
        state: &TableState,
    ) -> QueryResult<TableData> {
        let request = compile(binding, state);
        if request.is_unconfigured() {
            return Err(QueryError::Unconfigured);
        }
        let key = QueryKey::derive(binding, state);
        tracing::debug!("fetching table data for {:?}", key);
        let transport = Arc::clone(&self.transport);
        self.cache
            .fetch_with(key, move || {
                async move {
                    let raw = transport.execute(request).await?;
                    parse_response(&raw)
                }
                .boxed()
            })
            .await
    }

    /// Accept a server-rendered initial payload. It can only answer the
    /// default key (page zero, no live sort, search, or filters); any other
    /// key still triggers a fresh fetch, since the payload cannot answer it.
    pub fn seed(&self, binding: &TableBinding, data: TableData) -> bool {
        let key = QueryKey::derive(binding, &TableState::default());
        self.cache.seed(key, data)
    }

    /// Drop the cached outcome for one binding/state pair so the next fetch
    /// hits the network. This is the caller-initiated retry path; nothing in
    /// the core retries on its own.
    pub fn invalidate(&self, binding: &TableBinding, state: &TableState) {
        self.cache.invalidate(&QueryKey::derive(binding, state));
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Builder for [`TableClient`].
#[derive(Debug, Default)]
pub struct TableClientBuilder {
    cache_config: CacheConfig,
}

impl TableClientBuilder {
    /// Override the cache policy.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    pub fn build(self, transport: Arc<dyn Transport>) -> TableClient {
        TableClient {
            transport,
            cache: QueryCache::new(self.cache_config),
        }
    }
}
