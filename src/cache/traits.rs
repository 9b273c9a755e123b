//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// Trait for entities that can be cached.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Entity type name for storage organization (e.g., "movie")
  fn entity_type() -> &'static str;
}

/// Identifies one cached query result.
pub trait QueryKey {
  /// Stable storage key for this query
  fn cache_key(&self) -> String;

  /// Human-readable description, for logs
  fn description(&self) -> String;
}

/// Freshness of a cached query result.
///
/// Entries only become stale through explicit invalidation; there is no
/// time-based expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
  /// Nothing cached yet
  Missing,
  /// Served as-is
  Fresh,
  /// Re-fetched before it is served again
  Stale,
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from cached data.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }
}

/// Indicates where cached data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fetched from the store for this read
  Network,
  /// Served from a fresh cache entry
  Cache,
}
