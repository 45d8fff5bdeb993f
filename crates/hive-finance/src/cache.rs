//! Short-lived memo of tool results, so repeated questions about the same
//! ticker do not spend the Yahoo rate budget again

use cached::{Cached, TimedCache};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Which tool asked about which ticker
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub tool: String,
}

impl CacheKey {
    pub fn new(symbol: impl Into<String>, tool: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            tool: tool.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tool, self.symbol)
    }
}

/// Tool payloads kept for a fixed lifespan
///
/// Cloning is cheap and every clone sees the same entries, so the toolkit
/// hands one cache to all tools with the same freshness needs.
#[derive(Clone)]
pub struct FinanceCache {
    entries: Arc<Mutex<TimedCache<CacheKey, Value>>>,
}

impl FinanceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// A live entry for `key`; expired entries are dropped on lookup
    pub async fn get(&self, key: &CacheKey) -> Option<Value> {
        self.entries.lock().await.cache_get(key).cloned()
    }

    pub async fn insert(&self, key: CacheKey, value: Value) {
        self.entries.lock().await.cache_set(key, value);
    }

    /// Serve `key` from the cache or compute it with `fetch`
    ///
    /// A failed fetch leaves the cache untouched. The lock is not held while
    /// fetching, so two concurrent misses may both reach Yahoo.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: CacheKey, fetch: F) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(hit) = self.get(&key).await {
            debug!(%key, "finance cache hit");
            return Ok(hit);
        }
        debug!(%key, "finance cache miss");
        let fresh = fetch().await?;
        self.insert(key, fresh.clone()).await;
        Ok(fresh)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn minute() -> FinanceCache {
        FinanceCache::new(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_keys_are_per_tool() {
        let cache = minute();
        cache
            .insert(CacheKey::new("NVDA", "get_current_stock_price"), json!({"price": 150.0}))
            .await;

        assert_eq!(
            cache.get(&CacheKey::new("NVDA", "get_current_stock_price")).await,
            Some(json!({"price": 150.0}))
        );
        assert!(cache.get(&CacheKey::new("NVDA", "get_company_info")).await.is_none());
        assert_eq!(CacheKey::new("NVDA", "get_company_info").to_string(), "get_company_info/NVDA");
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let cache = minute();
        let fetches = AtomicUsize::new(0);
        let key = CacheKey::new("TSLA", "get_stock_fundamentals");

        for _ in 0..3 {
            let value = cache
                .get_or_fetch(key.clone(), || async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(json!({"pe_ratio": 60.2}))
                })
                .await
                .unwrap();
            assert_eq!(value["pe_ratio"], 60.2);
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_remembered() {
        let cache = minute();
        let key = CacheKey::new("ZZZZ", "get_company_info");

        let result = cache
            .get_or_fetch(key.clone(), || async { Err::<Value, _>("unknown symbol") })
            .await;
        assert_eq!(result, Err("unknown symbol"));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let cache = FinanceCache::new(Duration::from_millis(20));
        let key = CacheKey::new("AAPL", "get_current_stock_price");
        cache.insert(key.clone(), json!(1)).await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = minute();
        cache.clone().insert(CacheKey::new("AAPL", "x"), json!(1)).await;
        assert_eq!(cache.len().await, 1);
    }
}
