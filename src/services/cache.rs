use crate::models::CatalogProduct;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const CATALOG_KEY: &str = "catalog:available";

/// Shared, immutable catalog snapshot
pub type CatalogSnapshot = Arc<Vec<CatalogProduct>>;

/// In-memory cache for the available-products snapshot
///
/// The catalog changes rarely compared to how often recommendations are
/// mapped, so one snapshot is kept for `ttl_secs`. Failed fetches are never
/// stored.
#[derive(Clone)]
pub struct CatalogCache {
    snapshots: moka::future::Cache<String, CatalogSnapshot>,
    ttl_secs: u64,
}

impl CatalogCache {
    /// Create a new catalog cache
    pub fn new(ttl_secs: u64) -> Self {
        let snapshots = moka::future::CacheBuilder::new(1)
            .time_to_live(Duration::from_secs(ttl_secs.max(1)))
            .build();

        Self { snapshots, ttl_secs }
    }

    /// Get the cached snapshot, if still fresh
    pub async fn get(&self) -> Option<CatalogSnapshot> {
        let snapshot = self.snapshots.get(CATALOG_KEY).await;
        match &snapshot {
            Some(products) => tracing::trace!("Catalog cache hit ({} products)", products.len()),
            None => tracing::trace!("Catalog cache miss"),
        }
        snapshot
    }

    /// Store a freshly fetched snapshot
    pub async fn set(&self, products: Vec<CatalogProduct>) -> CatalogSnapshot {
        let snapshot = Arc::new(products);
        self.snapshots.insert(CATALOG_KEY.to_string(), snapshot.clone()).await;
        tracing::trace!("Catalog cache set ({} products)", snapshot.len());
        snapshot
    }

    /// Return the cached snapshot or run `fetch` and cache its result
    ///
    /// Concurrent misses wait on a single `fetch` and all receive its
    /// outcome. An error is handed to every waiter and never stored.
    pub async fn get_or_fetch<F, Fut, E>(&self, fetch: F) -> Result<CatalogSnapshot, Arc<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<CatalogProduct>, E>>,
        E: Send + Sync + 'static,
    {
        self.snapshots
            .try_get_with(CATALOG_KEY.to_string(), async move {
                let products = fetch().await?;
                tracing::trace!("Catalog cache filled ({} products)", products.len());
                Ok::<_, E>(Arc::new(products))
            })
            .await
    }

    /// Drop the snapshot so the next request refetches
    pub async fn invalidate(&self) {
        self.snapshots.invalidate(CATALOG_KEY).await;
        tracing::debug!("Invalidated catalog snapshot");
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            cached_products: self.get().await.map(|s| s.len()).unwrap_or(0),
            ttl_secs: self.ttl_secs,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub cached_products: usize,
    pub ttl_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_cache_set_get_invalidate() {
        let cache = CatalogCache::new(60);
        assert!(cache.get().await.is_none());

        cache.set(vec![CatalogProduct::new(1, "Lipid Panel", "")]).await;
        assert_eq!(cache.get().await.unwrap().len(), 1);
        assert_eq!(cache.stats().await.cached_products, 1);

        cache.invalidate().await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn test_get_or_fetch_only_fetches_once() {
        let cache = CatalogCache::new(60);

        let first: Result<_, Arc<String>> = cache
            .get_or_fetch(|| async { Ok(vec![CatalogProduct::new(1, "Cortisol", "")]) })
            .await;
        assert_eq!(first.unwrap().len(), 1);

        let second: Result<_, Arc<String>> = cache
            .get_or_fetch(|| async { Err("must not be called".to_string()) })
            .await;
        assert_eq!(second.unwrap()[0].name, "Cortisol");
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = CatalogCache::new(60);

        let failed: Result<CatalogSnapshot, Arc<String>> =
            cache.get_or_fetch(|| async { Err("down".to_string()) }).await;
        assert_eq!(*failed.unwrap_err(), "down");
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let cache = CatalogCache::new(60);
        let fetches = Arc::new(AtomicUsize::new(0));

        let callers: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let fetches = Arc::clone(&fetches);
                tokio::spawn(async move {
                    cache
                        .get_or_fetch(move || async move {
                            fetches.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(100)).await;
                            Ok::<_, String>(vec![CatalogProduct::new(1, "Lipid Panel", "")])
                        })
                        .await
                })
            })
            .collect();

        for caller in callers {
            let snapshot = caller.await.unwrap().unwrap();
            assert_eq!(snapshot.len(), 1);
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }
}
