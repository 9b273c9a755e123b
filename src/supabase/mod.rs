//! Thin PostgREST adapter for a Supabase-hosted table.

pub mod api_types;
pub mod client;
pub mod error;

pub use api_types::{EqFilter, OrderBy};
pub use client::TableClient;
pub use error::RemoteError;
