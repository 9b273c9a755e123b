//! Movie inventory: data access, caching and form handling.

pub mod cache;
pub mod cached_client;
pub mod client;
pub mod form;
#[cfg(test)]
pub mod memory;
pub mod store;
pub mod types;

pub use cached_client::CachedMovieClient;
pub use client::MovieClient;
pub use types::Movie;
