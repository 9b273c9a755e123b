//! Cache storage trait and in-memory implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use super::traits::{CacheState, Cacheable};

/// Result of a cached query lookup.
#[derive(Debug, Clone)]
pub struct CachedQueryResult<T> {
  /// The cached entities in order
  pub entities: Vec<T>,
  /// When the query result was cached
  pub cached_at: DateTime<Utc>,
  /// Whether the entry may be served
  pub state: CacheState,
}

/// What happened to a query result handed to [`CacheStorage::store_query_result`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
  /// Stored and may be served
  Fresh,
  /// Stored, but the key was invalidated while the result was being fetched
  Stale,
  /// Dropped because a result fetched later is already cached
  Superseded,
}

/// Trait for cache storage backends.
///
/// Every key carries a generation that [`mark_stale`](Self::mark_stale)
/// bumps. Readers take the generation before fetching and hand it back on
/// store, so an invalidation that lands mid-fetch is never lost.
pub trait CacheStorage: Send + Sync {
  /// Current generation of a key. Zero until first invalidated.
  fn generation(&self, key: &str) -> Result<u64>;

  /// Store entities fetched at `generation`.
  fn store_query_result<T: Cacheable>(
    &self,
    key: &str,
    entities: &[T],
    generation: u64,
  ) -> Result<StoreOutcome>;

  /// Get cached entities for a query.
  fn get_query_result<T: Cacheable>(&self, key: &str) -> Result<Option<CachedQueryResult<T>>>;

  /// Freshness of the entry without decoding it.
  fn query_state(&self, key: &str) -> Result<CacheState>;

  /// Bump the key's generation and mark its entry stale. Returns false when
  /// nothing was cached.
  fn mark_stale(&self, key: &str) -> Result<bool>;
}

struct Entry {
  entity_type: &'static str,
  data: Vec<Value>,
  cached_at: DateTime<Utc>,
  state: CacheState,
  /// Generation the data was fetched at
  generation: u64,
}

#[derive(Default)]
struct Inner {
  entries: HashMap<String, Entry>,
  generations: HashMap<String, u64>,
}

impl Inner {
  fn generation(&self, key: &str) -> u64 {
    self.generations.get(key).copied().unwrap_or(0)
  }
}

/// Process-local storage. Entries hold serialized JSON so a read never hands
/// out references into the cache.
#[derive(Default)]
pub struct MemoryStorage {
  inner: Mutex<Inner>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
    self
      .inner
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

impl CacheStorage for MemoryStorage {
  fn generation(&self, key: &str) -> Result<u64> {
    Ok(self.lock()?.generation(key))
  }

  fn store_query_result<T: Cacheable>(
    &self,
    key: &str,
    entities: &[T],
    generation: u64,
  ) -> Result<StoreOutcome> {
    let data = entities
      .iter()
      .map(serde_json::to_value)
      .collect::<Result<Vec<_>, _>>()
      .map_err(|e| eyre!("Failed to serialize entity: {}", e))?;

    let mut inner = self.lock()?;
    if inner
      .entries
      .get(key)
      .is_some_and(|entry| entry.generation > generation)
    {
      return Ok(StoreOutcome::Superseded);
    }

    let (state, outcome) = if generation == inner.generation(key) {
      (CacheState::Fresh, StoreOutcome::Fresh)
    } else {
      (CacheState::Stale, StoreOutcome::Stale)
    };

    inner.entries.insert(
      key.to_string(),
      Entry {
        entity_type: T::entity_type(),
        data,
        cached_at: Utc::now(),
        state,
        generation,
      },
    );

    Ok(outcome)
  }

  fn get_query_result<T: Cacheable>(&self, key: &str) -> Result<Option<CachedQueryResult<T>>> {
    let inner = self.lock()?;
    let entry = match inner.entries.get(key) {
      Some(entry) if entry.entity_type == T::entity_type() => entry,
      _ => return Ok(None),
    };

    let entities = entry
      .data
      .iter()
      .map(|value| serde_json::from_value(value.clone()))
      .collect::<Result<Vec<T>, _>>()
      .map_err(|e| eyre!("Failed to deserialize entity: {}", e))?;

    Ok(Some(CachedQueryResult {
      entities,
      cached_at: entry.cached_at,
      state: entry.state,
    }))
  }

  fn query_state(&self, key: &str) -> Result<CacheState> {
    Ok(
      self
        .lock()?
        .entries
        .get(key)
        .map(|entry| entry.state)
        .unwrap_or(CacheState::Missing),
    )
  }

  fn mark_stale(&self, key: &str) -> Result<bool> {
    let mut inner = self.lock()?;
    *inner.generations.entry(key.to_string()).or_insert(0) += 1;

    match inner.entries.get_mut(key) {
      Some(entry) => {
        entry.state = CacheState::Stale;
        Ok(true)
      }
      None => Ok(false),
    }
  }
}
