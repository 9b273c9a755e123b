//! Store seam for the movies table.

use async_trait::async_trait;

use crate::supabase::{EqFilter, OrderBy, RemoteError, TableClient};

use super::types::{Movie, MovieChanges, NewMovie};

/// Raw table operations the data access layer is built on.
///
/// Implementations make exactly one remote call per method and never retry.
#[async_trait]
pub trait MovieStore: Send + Sync {
  /// Every row, in the given order.
  async fn select(&self, order: OrderBy) -> Result<Vec<Movie>, RemoteError>;

  /// Insert one row; the store assigns `id`, `created_at` and `updated_at`.
  async fn insert(&self, row: &NewMovie) -> Result<Movie, RemoteError>;

  /// Patch the row with `id`. Fails when no such row exists.
  async fn update(&self, id: &str, changes: &MovieChanges) -> Result<Movie, RemoteError>;

  /// Delete the row with `id`.
  async fn delete(&self, id: &str) -> Result<(), RemoteError>;
}

/// [`MovieStore`] backed by a Supabase table.
#[derive(Clone)]
pub struct SupabaseMovieStore {
  table: TableClient,
}

impl SupabaseMovieStore {
  pub fn new(table: TableClient) -> Self {
    Self { table }
  }
}

#[async_trait]
impl MovieStore for SupabaseMovieStore {
  async fn select(&self, order: OrderBy) -> Result<Vec<Movie>, RemoteError> {
    self.table.select_all(order).await
  }

  async fn insert(&self, row: &NewMovie) -> Result<Movie, RemoteError> {
    self.table.insert_one(row).await
  }

  async fn update(&self, id: &str, changes: &MovieChanges) -> Result<Movie, RemoteError> {
    self.table.update_one(EqFilter::id(id), changes).await
  }

  async fn delete(&self, id: &str) -> Result<(), RemoteError> {
    self.table.delete(EqFilter::id(id)).await
  }
}
