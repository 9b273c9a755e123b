//! Cache layer that orchestrates caching logic with network fetching.

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::storage::{CacheStorage, StoreOutcome};
use super::traits::{CacheResult, CacheState, Cacheable, QueryKey};

/// Cache layer that manages caching logic and network fetching.
///
/// Fresh entries are served without touching the network. Entries turn stale
/// only through [`invalidate`](Self::invalidate), after which the next read
/// goes to the fetcher. A result fetched across an invalidation is cached as
/// stale. Storage failures degrade to a cache miss.
pub struct CacheLayer<S: CacheStorage> {
  storage: Arc<S>,
}

impl<S: CacheStorage> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
    }
  }

  /// Current freshness of a query's entry.
  pub fn state<K: QueryKey>(&self, key: &K) -> CacheState {
    self
      .storage
      .query_state(&key.cache_key())
      .unwrap_or_else(|e| {
        warn!(query = %key.description(), error = %e, "cache state unavailable");
        CacheState::Missing
      })
  }

  /// Mark a query's entry stale so the next read re-fetches.
  pub fn invalidate<K: QueryKey>(&self, key: &K) {
    match self.storage.mark_stale(&key.cache_key()) {
      Ok(true) => debug!(query = %key.description(), "invalidated cache entry"),
      Ok(false) => {}
      Err(e) => warn!(query = %key.description(), error = %e, "failed to invalidate cache entry"),
    }
  }

  /// Fetch a list, serving a fresh cache entry when there is one.
  ///
  /// 1. Fresh entry - return it, the fetcher is not called
  /// 2. Stale or missing - call the fetcher
  /// 3. Fetch succeeded - store and return. The entry is fresh unless the key
  ///    was invalidated while the fetcher ran
  /// 4. Fetch failed - return the error, the entry is left as it was
  pub async fn fetch_list<T, K, E, F, Fut>(
    &self,
    key: &K,
    fetcher: F,
  ) -> Result<CacheResult<Vec<T>>, E>
  where
    T: Cacheable,
    K: QueryKey,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
  {
    let cache_key = key.cache_key();

    match self.storage.get_query_result::<T>(&cache_key) {
      Ok(Some(cached)) if cached.state == CacheState::Fresh => {
        return Ok(CacheResult::from_cache(cached.entities, cached.cached_at));
      }
      Ok(_) => {}
      Err(e) => warn!(query = %key.description(), error = %e, "cache read failed"),
    }

    // Taken before fetching so an invalidation during the fetch is seen on store
    let generation = match self.storage.generation(&cache_key) {
      Ok(generation) => Some(generation),
      Err(e) => {
        warn!(query = %key.description(), error = %e, "cache generation unavailable");
        None
      }
    };

    let data = fetcher().await?;

    let Some(generation) = generation else {
      return Ok(CacheResult::from_network(data));
    };
    match self.storage.store_query_result(&cache_key, &data, generation) {
      Ok(StoreOutcome::Fresh) => {
        debug!(query = %key.description(), count = data.len(), "cached query result")
      }
      Ok(StoreOutcome::Stale) => {
        debug!(query = %key.description(), "invalidated during fetch, cached as stale")
      }
      Ok(StoreOutcome::Superseded) => {
        debug!(query = %key.description(), "newer result already cached, discarded")
      }
      Err(e) => warn!(query = %key.description(), error = %e, "cache write failed"),
    }

    Ok(CacheResult::from_network(data))
  }
}

impl<S: CacheStorage> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::storage::MemoryStorage;
  use crate::cache::traits::CacheSource;
  use serde::{Deserialize, Serialize};
  use std::sync::atomic::{AtomicUsize, Ordering};

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Reel(u32);

  impl Cacheable for Reel {
    fn entity_type() -> &'static str {
      "reel"
    }
  }

  struct Key;

  impl QueryKey for Key {
    fn cache_key(&self) -> String {
      "reels".to_string()
    }

    fn description(&self) -> String {
      "all reels".to_string()
    }
  }

  async fn fetch(
    cache: &CacheLayer<MemoryStorage>,
    calls: &AtomicUsize,
    result: Result<Vec<Reel>, String>,
  ) -> Result<CacheResult<Vec<Reel>>, String> {
    cache
      .fetch_list(&Key, move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        result
      })
      .await
  }

  #[tokio::test]
  async fn test_fresh_entry_is_served_without_fetching() {
    let cache = CacheLayer::new(MemoryStorage::new());
    let calls = AtomicUsize::new(0);
    assert_eq!(cache.state(&Key), CacheState::Missing);

    let first = fetch(&cache, &calls, Ok(vec![Reel(1)])).await.unwrap();
    assert_eq!(first.source, CacheSource::Network);
    assert_eq!(cache.state(&Key), CacheState::Fresh);

    let second = fetch(&cache, &calls, Ok(vec![Reel(2)])).await.unwrap();
    assert_eq!(second.source, CacheSource::Cache);
    assert_eq!(second.data, vec![Reel(1)]);
    assert!(second.cached_at.is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_invalidated_entry_is_refetched() {
    let cache = CacheLayer::new(MemoryStorage::new());
    let calls = AtomicUsize::new(0);

    fetch(&cache, &calls, Ok(vec![Reel(1)])).await.unwrap();
    cache.invalidate(&Key);
    assert_eq!(cache.state(&Key), CacheState::Stale);

    let refreshed = fetch(&cache, &calls, Ok(vec![Reel(2), Reel(1)]))
      .await
      .unwrap();
    assert_eq!(refreshed.source, CacheSource::Network);
    assert_eq!(refreshed.data, vec![Reel(2), Reel(1)]);
    assert_eq!(cache.state(&Key), CacheState::Fresh);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_failed_fetch_propagates_and_leaves_entry() {
    let cache = CacheLayer::new(MemoryStorage::new());
    let calls = AtomicUsize::new(0);

    let err = fetch(&cache, &calls, Err("offline".to_string()))
      .await
      .unwrap_err();
    assert_eq!(err, "offline");
    assert_eq!(cache.state(&Key), CacheState::Missing);

    fetch(&cache, &calls, Ok(vec![Reel(1)])).await.unwrap();
    cache.invalidate(&Key);
    assert!(fetch(&cache, &calls, Err("offline".to_string())).await.is_err());
    assert_eq!(cache.state(&Key), CacheState::Stale);
  }

  #[test]
  fn test_invalidate_missing_entry_is_noop() {
    let cache = CacheLayer::new(MemoryStorage::new());
    cache.invalidate(&Key);
    assert_eq!(cache.state(&Key), CacheState::Missing);
  }

  #[tokio::test]
  async fn test_invalidation_during_first_fetch_is_kept() {
    let cache = CacheLayer::new(MemoryStorage::new());

    let result = cache
      .fetch_list(&Key, || async {
        cache.invalidate(&Key);
        Ok::<_, String>(vec![Reel(1)])
      })
      .await
      .unwrap();

    assert_eq!(result.data, vec![Reel(1)]);
    assert_eq!(cache.state(&Key), CacheState::Stale);
  }

  #[tokio::test]
  async fn test_invalidation_during_refetch_is_kept() {
    let cache = CacheLayer::new(MemoryStorage::new());
    let calls = AtomicUsize::new(0);
    fetch(&cache, &calls, Ok(vec![Reel(1)])).await.unwrap();
    cache.invalidate(&Key);

    cache
      .fetch_list(&Key, || async {
        cache.invalidate(&Key);
        Ok::<_, String>(vec![Reel(1)])
      })
      .await
      .unwrap();
    assert_eq!(cache.state(&Key), CacheState::Stale);

    let next = fetch(&cache, &calls, Ok(vec![Reel(2), Reel(1)])).await.unwrap();
    assert_eq!(next.source, CacheSource::Network);
    assert_eq!(cache.state(&Key), CacheState::Fresh);
  }
}
