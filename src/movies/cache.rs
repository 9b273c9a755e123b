//! Caching implementations for movie types.

use crate::cache::{Cacheable, QueryKey};

use super::types::Movie;

impl Cacheable for Movie {
  fn entity_type() -> &'static str {
    "movie"
  }
}

/// Query keys for movie reads. There is a single, parameterless list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovieQueryKey {
  /// Every movie, newest first
  All,
}

impl QueryKey for MovieQueryKey {
  fn cache_key(&self) -> String {
    match self {
      Self::All => "movies:list".to_string(),
    }
  }

  fn description(&self) -> String {
    match self {
      Self::All => "all movies".to_string(),
    }
  }
}
