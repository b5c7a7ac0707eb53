//! Query cache with staleness, garbage collection, and in-flight
//! de-duplication.
//!
//! Entries are keyed by [`QueryKey`] and hold the parsed outcome, errors
//! included, so a caller can render an error state from cache. At most one
//! request per key is ever in flight: late callers join the pending result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use gridq_core::error::QueryError;
use gridq_core::key::QueryKey;
use gridq_core::resolve::TableData;

/// The parsed result stored per key. Errors are values here, not exceptions.
pub type QueryOutcome = Result<TableData, QueryError>;

type PendingQuery = Shared<BoxFuture<'static, QueryOutcome>>;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Entries younger than this are served without a re-fetch.
    pub fresh_for: Duration,
    /// Entries unread for this long are garbage-collected.
    pub gc_after: Duration,
    pub max_entries: usize,
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fresh_for: Duration::from_secs(5 * 60),
            gc_after: Duration::from_secs(10 * 60),
            max_entries: 1000,
            enabled: true,
        }
    }
}

enum Slot {
    InFlight(PendingQuery),
    Ready(ReadySlot),
}

struct ReadySlot {
    outcome: QueryOutcome,
    fetched_at: Instant,
    last_access: Instant,
}

impl ReadySlot {
    fn new(outcome: QueryOutcome) -> Self {
        let now = Instant::now();
        Self {
            outcome,
            fetched_at: now,
            last_access: now,
        }
    }
}

pub struct QueryCache {
    entries: DashMap<QueryKey, Slot>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Look up a fresh outcome without dispatching anything.
    pub fn get(&self, key: &QueryKey) -> Option<QueryOutcome> {
        if !self.config.enabled {
            return None;
        }
        let mut entry = self.entries.get_mut(key)?;
        match entry.value_mut() {
            Slot::Ready(ready) if ready.fetched_at.elapsed() < self.config.fresh_for => {
                ready.last_access = Instant::now();
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(ready.outcome.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Serve `key` from cache, join the in-flight request for it, or run
    /// `load` and store what it produces.
    pub async fn fetch_with<F>(&self, key: QueryKey, load: F) -> QueryOutcome
    where
        F: FnOnce() -> BoxFuture<'static, QueryOutcome>,
    {
        if !self.config.enabled {
            return load().await;
        }
        let pending = {
            match self.entries.entry(key.clone()) {
                Entry::Occupied(mut occupied) => {
                    let fresh = match occupied.get() {
                        Slot::Ready(ready)
                            if ready.fetched_at.elapsed() < self.config.fresh_for =>
                        {
                            Some(ready.outcome.clone())
                        }
                        _ => None,
                    };
                    if let Some(outcome) = fresh {
                        if let Slot::Ready(ready) = occupied.get_mut() {
                            ready.last_access = Instant::now();
                        }
                        self.hits.fetch_add(1, Ordering::Relaxed);
                        return outcome;
                    }
                    match occupied.get() {
                        Slot::InFlight(pending) => {
                            self.hits.fetch_add(1, Ordering::Relaxed);
                            pending.clone()
                        }
                        Slot::Ready(_) => {
                            self.misses.fetch_add(1, Ordering::Relaxed);
                            let pending = load().shared();
                            occupied.insert(Slot::InFlight(pending.clone()));
                            pending
                        }
                    }
                }
                Entry::Vacant(vacant) => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    let pending = load().shared();
                    vacant.insert(Slot::InFlight(pending.clone()));
                    pending
                }
            }
        };
        let outcome = pending.await;
        self.store(key, outcome.clone());
        outcome
    }

    /// Accept a server-rendered payload as the entry for `key` without a
    /// fetch. Fills vacancy only: a client-fetched entry is never replaced
    /// by the seed. Returns whether the seed was stored.
    pub fn seed(&self, key: QueryKey, data: TableData) -> bool {
        if !self.config.enabled {
            return false;
        }
        match self.entries.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(Slot::Ready(ReadySlot::new(Ok(data))));
                true
            }
        }
    }

    pub fn invalidate(&self, key: &QueryKey) {
        self.entries.remove(key);
    }

    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    /// Drop entries unread past the GC window. In-flight entries are kept;
    /// they resolve and store shortly.
    pub fn evict_stale(&self) {
        let before = self.entries.len();
        let gc_after = self.config.gc_after;
        self.entries.retain(|_, slot| match slot {
            Slot::Ready(ready) => ready.last_access.elapsed() < gc_after,
            Slot::InFlight(_) => true,
        });
        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::debug!("evicted {} stale query cache entries", evicted);
        }
    }

    fn store(&self, key: QueryKey, outcome: QueryOutcome) {
        if self.entries.len() > self.config.max_entries {
            self.evict_stale();
        }
        self.entries.insert(key, Slot::Ready(ReadySlot::new(outcome)));
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Hit rate as a percentage.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridq_core::binding::TableBinding;
    use gridq_core::state::TableState;
    use serde_json::json;

    fn key(page: u32) -> QueryKey {
        let binding = TableBinding {
            table_name: Some("orders".into()),
            ..Default::default()
        };
        QueryKey::derive(&binding, &TableState::new().with_page(page))
    }

    fn rows(n: u64) -> TableData {
        TableData {
            rows: vec![json!({ "id": n })],
            total: n,
        }
    }

    #[tokio::test]
    async fn test_fresh_entry_skips_loader() {
        let cache = QueryCache::default();
        let first = cache
            .fetch_with(key(0), || async { Ok(rows(1)) }.boxed())
            .await;
        assert_eq!(first, Ok(rows(1)));
        // Loader would produce different data; the cached outcome wins.
        let second = cache
            .fetch_with(key(0), || async { Ok(rows(2)) }.boxed())
            .await;
        assert_eq!(second, Ok(rows(1)));
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_stale_entry_reloads() {
        let cache = QueryCache::new(CacheConfig {
            fresh_for: Duration::ZERO,
            ..Default::default()
        });
        cache
            .fetch_with(key(0), || async { Ok(rows(1)) }.boxed())
            .await
            .unwrap();
        let second = cache
            .fetch_with(key(0), || async { Ok(rows(2)) }.boxed())
            .await;
        assert_eq!(second, Ok(rows(2)));
    }

    #[tokio::test]
    async fn test_errors_are_cached_outcomes() {
        let cache = QueryCache::default();
        let outcome = cache
            .fetch_with(key(0), || {
                async { Err(QueryError::Transport("timeout".into())) }.boxed()
            })
            .await;
        assert!(outcome.is_err());
        assert_eq!(cache.get(&key(0)), Some(outcome));
    }

    #[tokio::test]
    async fn test_seed_fills_vacancy_only() {
        let cache = QueryCache::default();
        assert!(cache.seed(key(0), rows(1)));
        assert!(!cache.seed(key(0), rows(2)));
        assert_eq!(cache.get(&key(0)), Some(Ok(rows(1))));
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let cache = QueryCache::default();
        cache
            .fetch_with(key(0), || async { Ok(rows(1)) }.boxed())
            .await
            .unwrap();
        cache.invalidate(&key(0));
        let reloaded = cache
            .fetch_with(key(0), || async { Ok(rows(2)) }.boxed())
            .await;
        assert_eq!(reloaded, Ok(rows(2)));
    }

    #[test]
    fn test_gc_drops_unread_entries() {
        let cache = QueryCache::new(CacheConfig {
            gc_after: Duration::ZERO,
            ..Default::default()
        });
        assert!(cache.seed(key(0), rows(1)));
        cache.evict_stale();
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let cache = QueryCache::new(CacheConfig {
            enabled: false,
            ..Default::default()
        });
        assert!(!cache.seed(key(0), rows(1)));
        assert!(cache.get(&key(0)).is_none());
    }
}
