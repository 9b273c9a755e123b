use color_eyre::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::supabase::{OrderBy, RemoteError, TableClient};

use super::store::{MovieStore, SupabaseMovieStore};
use super::types::{Movie, MovieChanges, NewMovie, STATUS_AVAILABLE};

/// Order of the movie list: newest first
const LIST_ORDER: OrderBy = OrderBy::desc("created_at");

/// Movie data access: one store call per operation, errors passed through untouched.
#[derive(Clone)]
pub struct MovieClient {
  store: Arc<dyn MovieStore>,
}

impl MovieClient {
  pub fn new(config: &Config) -> Result<Self> {
    let api_key = Config::get_api_key()?;
    let table = TableClient::new(&config.supabase, &config.table, api_key)?;
    info!(endpoint = %table.endpoint(), "using movie table");

    Ok(Self::with_store(Arc::new(SupabaseMovieStore::new(table))))
  }

  pub fn with_store(store: Arc<dyn MovieStore>) -> Self {
    Self { store }
  }

  /// List every movie, newest first
  pub async fn list_movies(&self) -> Result<Vec<Movie>, RemoteError> {
    let movies = self.store.select(LIST_ORDER).await.inspect_err(|e| {
      warn!(error = %e, "failed to list movies");
    })?;

    debug!(count = movies.len(), "listed movies");
    Ok(movies)
  }

  /// Create a movie. A missing availability status is sent as "available".
  pub async fn create_movie(&self, mut input: NewMovie) -> Result<Movie, RemoteError> {
    input
      .availability_status
      .get_or_insert_with(|| STATUS_AVAILABLE.to_string());

    let movie = self.store.insert(&input).await.inspect_err(|e| {
      warn!(title = %input.title, error = %e, "failed to create movie");
    })?;

    info!(id = %movie.id, title = %movie.title, "created movie");
    Ok(movie)
  }

  /// Apply a partial update to the movie with `id`
  pub async fn update_movie(&self, id: &str, changes: MovieChanges) -> Result<Movie, RemoteError> {
    let movie = self.store.update(id, &changes).await.inspect_err(|e| {
      warn!(id, error = %e, "failed to update movie");
    })?;

    info!(id, "updated movie");
    Ok(movie)
  }

  /// Delete the movie with `id`. Unknown ids are whatever the store makes of them.
  pub async fn delete_movie(&self, id: &str) -> Result<(), RemoteError> {
    self.store.delete(id).await.inspect_err(|e| {
      warn!(id, error = %e, "failed to delete movie");
    })?;

    info!(id, "deleted movie");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::movies::memory::{stored, MemoryMovieStore};
  use crate::movies::types::STATUS_RENTED;

  fn dune() -> NewMovie {
    NewMovie {
      title: "Dune".to_string(),
      description: None,
      genre: "Sci-Fi".to_string(),
      release_year: 2021,
      availability_status: None,
      rental_price: 4.99,
    }
  }

  fn client_with(store: MemoryMovieStore) -> (MovieClient, Arc<MemoryMovieStore>) {
    let store = Arc::new(store);
    (MovieClient::with_store(store.clone()), store)
  }

  #[tokio::test]
  async fn test_create_then_list_contains_exactly_one_new_record() {
    let (client, _) = client_with(MemoryMovieStore::with_rows(vec![stored("a", "Alien", 0)]));

    let created = client.create_movie(dune()).await.unwrap();
    let movies = client.list_movies().await.unwrap();

    assert_eq!(movies.len(), 2);
    let matching: Vec<_> = movies.iter().filter(|m| m.title == "Dune").collect();
    assert_eq!(matching.len(), 1);

    let movie = matching[0];
    assert_eq!(movie, &created);
    assert!(!movie.id.is_empty());
    assert_eq!(movie.genre, "Sci-Fi");
    assert_eq!(movie.release_year, 2021);
    assert_eq!(movie.rental_price, 4.99);
    assert_eq!(movie.created_at, movie.updated_at);
  }

  #[tokio::test]
  async fn test_create_defaults_availability_to_available() {
    let (client, _) = client_with(MemoryMovieStore::new());

    let movie = client.create_movie(dune()).await.unwrap();
    assert_eq!(movie.availability_status, STATUS_AVAILABLE);

    let rented = NewMovie {
      availability_status: Some(STATUS_RENTED.to_string()),
      ..dune()
    };
    let movie = client.create_movie(rented).await.unwrap();
    assert_eq!(movie.availability_status, STATUS_RENTED);
  }

  #[tokio::test]
  async fn test_update_price_keeps_id() {
    let (client, _) = client_with(MemoryMovieStore::new());
    let created = client.create_movie(dune()).await.unwrap();

    let updated = client
      .update_movie(&created.id, MovieChanges::rental_price(9.99))
      .await
      .unwrap();
    assert_eq!(updated.id, created.id);

    let refetched = client
      .list_movies()
      .await
      .unwrap()
      .into_iter()
      .find(|m| m.id == created.id)
      .unwrap();
    assert_eq!(refetched.rental_price, 9.99);
    assert_eq!(refetched.title, "Dune");
    assert!(refetched.updated_at > created.updated_at);
  }

  #[tokio::test]
  async fn test_update_unknown_id_fails() {
    let (client, _) = client_with(MemoryMovieStore::new());

    let err = client
      .update_movie("missing", MovieChanges::rental_price(1.0))
      .await
      .unwrap_err();
    assert_eq!(err.code.as_deref(), Some("PGRST116"));
  }

  #[tokio::test]
  async fn test_delete_removes_row_and_unknown_id_is_noop() {
    let (client, _) = client_with(MemoryMovieStore::new());
    let created = client.create_movie(dune()).await.unwrap();

    client.delete_movie(&created.id).await.unwrap();
    let movies = client.list_movies().await.unwrap();
    assert!(movies.iter().all(|m| m.id != created.id));

    client.delete_movie(&created.id).await.unwrap();
  }

  #[tokio::test]
  async fn test_list_is_newest_first_for_any_insertion_order() {
    let rows = vec![
      stored("b", "Second", 20),
      stored("d", "Fourth", 40),
      stored("a", "First", 10),
      stored("c", "Third", 30),
    ];
    let (client, _) = client_with(MemoryMovieStore::with_rows(rows));

    let movies = client.list_movies().await.unwrap();
    let ids: Vec<_> = movies.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["d", "c", "b", "a"]);
    assert!(movies.windows(2).all(|w| w[0].created_at >= w[1].created_at));
  }

  #[tokio::test]
  async fn test_store_errors_propagate_without_retry() {
    let (client, store) = client_with(MemoryMovieStore::new());
    store.fail_with("connection refused");

    let err = client.list_movies().await.unwrap_err();
    assert_eq!(err.to_string(), "connection refused");
    assert_eq!(store.calls(), 1);

    assert!(client.create_movie(dune()).await.is_err());
    assert_eq!(store.calls(), 2);
  }
}
