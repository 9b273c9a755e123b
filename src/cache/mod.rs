//! Generic query cache with invalidate-and-refetch semantics.
//!
//! This module is movie-agnostic:
//! - Caches ordered query results keyed by a [`QueryKey`]
//! - Serves fresh entries without fetching
//! - Re-fetches entries marked stale by [`CacheLayer::invalidate`]
//! - Never persists anything beyond the process

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::MemoryStorage;
pub use traits::{CacheState, Cacheable, QueryKey};
