//! Movie client with a cached list and refresh-on-write.

use std::future::Future;
use tracing::debug;

use crate::cache::{CacheLayer, CacheState, MemoryStorage};
use crate::notify::{Notification, Notifier};
use crate::supabase::RemoteError;

use super::cache::MovieQueryKey;
use super::client::MovieClient;
use super::types::{Movie, MovieChanges, NewMovie};

/// The three writes, with the wording shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteKind {
  Create,
  Update,
  Delete,
}

impl WriteKind {
  fn success_message(self) -> &'static str {
    match self {
      Self::Create => "Movie added successfully!",
      Self::Update => "Movie updated successfully!",
      Self::Delete => "Movie deleted successfully!",
    }
  }

  fn failure_message(self, err: &RemoteError) -> String {
    let verb = match self {
      Self::Create => "add",
      Self::Update => "update",
      Self::Delete => "delete",
    };
    format!("Failed to {} movie: {}", verb, err)
  }
}

/// Movie client with a cached list.
///
/// Reads go through the cache. A successful write marks the list stale and
/// raises a success notification; a failed write leaves the cache alone and
/// raises one error notification. Errors are still returned to the caller.
#[derive(Clone)]
pub struct CachedMovieClient {
  inner: MovieClient,
  cache: CacheLayer<MemoryStorage>,
  notifier: Notifier,
}

impl CachedMovieClient {
  pub fn new(inner: MovieClient, notifier: Notifier) -> Self {
    Self {
      inner,
      cache: CacheLayer::new(MemoryStorage::new()),
      notifier,
    }
  }

  /// List movies, newest first, from cache when fresh.
  pub async fn list_movies(&self) -> Result<Vec<Movie>, RemoteError> {
    let result = self
      .cache
      .fetch_list(&MovieQueryKey::All, || {
        let inner = self.inner.clone();
        async move { inner.list_movies().await }
      })
      .await?;

    debug!(source = ?result.source, cached_at = ?result.cached_at, "movie list served");
    Ok(result.data)
  }

  /// Freshness of the cached list; views re-fetch when it turns stale.
  pub fn list_state(&self) -> CacheState {
    self.cache.state(&MovieQueryKey::All)
  }

  /// Force the next list read to hit the store.
  pub fn refresh(&self) {
    self.cache.invalidate(&MovieQueryKey::All);
  }

  pub async fn create_movie(&self, input: NewMovie) -> Result<Movie, RemoteError> {
    self
      .mutate(WriteKind::Create, self.inner.create_movie(input))
      .await
  }

  pub async fn update_movie(&self, id: &str, changes: MovieChanges) -> Result<Movie, RemoteError> {
    self
      .mutate(WriteKind::Update, self.inner.update_movie(id, changes))
      .await
  }

  pub async fn delete_movie(&self, id: &str) -> Result<(), RemoteError> {
    self
      .mutate(WriteKind::Delete, self.inner.delete_movie(id))
      .await
  }

  async fn mutate<T, Fut>(&self, kind: WriteKind, write: Fut) -> Result<T, RemoteError>
  where
    Fut: Future<Output = Result<T, RemoteError>>,
  {
    match write.await {
      Ok(value) => {
        self.cache.invalidate(&MovieQueryKey::All);
        self
          .notifier
          .notify(Notification::success(kind.success_message()));
        Ok(value)
      }
      Err(err) => {
        self
          .notifier
          .notify(Notification::error(kind.failure_message(&err)));
        Err(err)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::movies::memory::{stored, MemoryMovieStore};
  use crate::movies::store::MovieStore;
  use crate::movies::types::{STATUS_AVAILABLE, STATUS_RENTED};
  use crate::notify::{self, Level, NotificationCenter};
  use crate::supabase::OrderBy;
  use async_trait::async_trait;
  use std::collections::VecDeque;
  use std::sync::{Arc, Mutex};
  use tokio::sync::{oneshot, Notify};

  fn setup(store: MemoryMovieStore) -> (CachedMovieClient, Arc<MemoryMovieStore>, NotificationCenter) {
    let store = Arc::new(store);
    let (notifier, center) = notify::channel();
    let client = CachedMovieClient::new(MovieClient::with_store(store.clone()), notifier);
    (client, store, center)
  }

  /// Store whose reads take their rows, then wait for the next queued gate
  /// before answering. Reads with no gate queued answer at once and do not
  /// signal `read_taken`.
  struct GatedStore {
    inner: MemoryMovieStore,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    read_taken: Notify,
  }

  impl GatedStore {
    fn new(inner: MemoryMovieStore) -> Self {
      Self {
        inner,
        gates: Mutex::new(VecDeque::new()),
        read_taken: Notify::new(),
      }
    }

    /// Hold the next read until the returned sender fires.
    fn hold_next_read(&self) -> oneshot::Sender<()> {
      let (open, gate) = oneshot::channel();
      self.gates.lock().unwrap().push_back(gate);
      open
    }
  }

  #[async_trait]
  impl MovieStore for GatedStore {
    async fn select(&self, order: OrderBy) -> Result<Vec<Movie>, RemoteError> {
      let rows = self.inner.select(order).await?;
      let gate = self.gates.lock().unwrap().pop_front();
      if let Some(gate) = gate {
        self.read_taken.notify_one();
        let _ = gate.await;
      }
      Ok(rows)
    }

    async fn insert(&self, row: &NewMovie) -> Result<Movie, RemoteError> {
      self.inner.insert(row).await
    }

    async fn update(&self, id: &str, changes: &MovieChanges) -> Result<Movie, RemoteError> {
      self.inner.update(id, changes).await
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
      self.inner.delete(id).await
    }
  }

  fn gated_setup(rows: Vec<Movie>) -> (CachedMovieClient, Arc<GatedStore>) {
    let store = Arc::new(GatedStore::new(MemoryMovieStore::with_rows(rows)));
    let (notifier, _center) = notify::channel();
    let client = CachedMovieClient::new(MovieClient::with_store(store.clone()), notifier);
    (client, store)
  }

  fn spawn_list(client: &CachedMovieClient) -> tokio::task::JoinHandle<Result<Vec<Movie>, RemoteError>> {
    let client = client.clone();
    tokio::spawn(async move { client.list_movies().await })
  }

  fn titles(movies: &[Movie]) -> Vec<&str> {
    movies.iter().map(|m| m.title.as_str()).collect()
  }

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

  #[tokio::test]
  async fn test_list_is_served_from_cache_until_a_write() {
    let (client, store, _center) = setup(MemoryMovieStore::with_rows(vec![stored("a", "Alien", 1)]));

    client.list_movies().await.unwrap();
    client.list_movies().await.unwrap();
    assert_eq!(store.calls(), 1);
    assert_eq!(client.list_state(), CacheState::Fresh);

    client.create_movie(dune()).await.unwrap();
    assert_eq!(client.list_state(), CacheState::Stale);

    let movies = client.list_movies().await.unwrap();
    assert_eq!(movies.len(), 2);
    assert_eq!(store.calls(), 3);
    assert_eq!(client.list_state(), CacheState::Fresh);
  }

  #[tokio::test]
  async fn test_successful_write_raises_one_success_notification() {
    let (client, _store, mut center) = setup(MemoryMovieStore::new());

    client.create_movie(dune()).await.unwrap();

    let raised = center.drain();
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].level, Level::Success);
    assert_eq!(raised[0].message, "Movie added successfully!");
  }

  #[tokio::test]
  async fn test_failed_write_keeps_cache_and_raises_one_error() {
    let (client, store, mut center) = setup(MemoryMovieStore::with_rows(vec![stored("a", "Alien", 1)]));
    let before = client.list_movies().await.unwrap();

    store.fail_with("duplicate key value violates unique constraint");
    let err = client.create_movie(dune()).await.unwrap_err();
    assert_eq!(err.message, "duplicate key value violates unique constraint");

    assert_eq!(client.list_state(), CacheState::Fresh);
    let after = client.list_movies().await.unwrap();
    assert_eq!(after, before);

    let raised = center.drain();
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].level, Level::Error);
    assert_eq!(
      raised[0].message,
      "Failed to add movie: duplicate key value violates unique constraint"
    );

    store.recover();
    client.create_movie(dune()).await.unwrap();
    assert_eq!(client.list_state(), CacheState::Stale);
    assert_eq!(titles(&client.list_movies().await.unwrap()), vec!["Dune", "Alien"]);
  }

  #[tokio::test]
  async fn test_failed_update_and_delete_use_their_own_wording() {
    let (client, store, mut center) = setup(MemoryMovieStore::new());
    store.fail_with("permission denied");

    assert!(client
      .update_movie("x", MovieChanges::rental_price(1.0))
      .await
      .is_err());
    assert!(client.delete_movie("x").await.is_err());

    let messages: Vec<_> = center.drain().into_iter().map(|n| n.message).collect();
    assert_eq!(
      messages,
      vec![
        "Failed to update movie: permission denied".to_string(),
        "Failed to delete movie: permission denied".to_string(),
      ]
    );
  }

  #[tokio::test]
  async fn test_failed_list_is_returned_not_notified() {
    let (client, store, mut center) = setup(MemoryMovieStore::new());
    store.fail_with("connection reset");

    let err = client.list_movies().await.unwrap_err();
    assert_eq!(err.to_string(), "connection reset");
    assert_eq!(client.list_state(), CacheState::Missing);
    assert!(center.drain().is_empty());
  }

  #[tokio::test]
  async fn test_refresh_forces_refetch() {
    let (client, store, _center) = setup(MemoryMovieStore::new());
    client.list_movies().await.unwrap();

    client.refresh();
    client.list_movies().await.unwrap();
    assert_eq!(store.calls(), 2);
  }

  #[tokio::test]
  async fn test_dune_lifecycle() {
    let (client, _store, mut center) = setup(MemoryMovieStore::with_rows(vec![
      stored("a", "Alien", 1),
      stored("b", "Brazil", 2),
    ]));
    client.list_movies().await.unwrap();

    let dune = client.create_movie(dune()).await.unwrap();
    let movies = client.list_movies().await.unwrap();
    assert_eq!(movies[0].id, dune.id);
    assert_eq!(movies[0].availability_status, STATUS_AVAILABLE);

    client
      .update_movie(&dune.id, MovieChanges::availability_status(STATUS_RENTED))
      .await
      .unwrap();
    let movies = client.list_movies().await.unwrap();
    let listed = movies.iter().find(|m| m.id == dune.id).unwrap();
    assert_eq!(listed.availability_status, STATUS_RENTED);

    client.delete_movie(&dune.id).await.unwrap();
    let movies = client.list_movies().await.unwrap();
    assert!(movies.iter().all(|m| m.id != dune.id));
    assert_eq!(movies.len(), 2);

    let levels: Vec<_> = center.drain().into_iter().map(|n| n.level).collect();
    assert_eq!(levels, vec![Level::Success; 3]);
  }

  #[tokio::test]
  async fn test_write_during_first_load_is_not_lost() {
    let (client, store) = gated_setup(vec![stored("a", "Alien", 1)]);
    let open = store.hold_next_read();

    let reader = spawn_list(&client);
    store.read_taken.notified().await;

    client.create_movie(dune()).await.unwrap();
    open.send(()).unwrap();

    // The held read answers with what it saw, but must not be cached as current
    let seen = reader.await.unwrap().unwrap();
    assert_eq!(titles(&seen), vec!["Alien"]);
    assert_ne!(client.list_state(), CacheState::Fresh);

    let movies = client.list_movies().await.unwrap();
    assert_eq!(titles(&movies), vec!["Dune", "Alien"]);
    assert_eq!(client.list_state(), CacheState::Fresh);
  }

  #[tokio::test]
  async fn test_write_during_refetch_is_not_lost() {
    let (client, store) = gated_setup(vec![stored("a", "Alien", 1)]);
    client.list_movies().await.unwrap();

    client.refresh();
    let open = store.hold_next_read();
    let reader = spawn_list(&client);
    store.read_taken.notified().await;

    client.create_movie(dune()).await.unwrap();
    open.send(()).unwrap();
    reader.await.unwrap().unwrap();

    assert_eq!(client.list_state(), CacheState::Stale);
    let movies = client.list_movies().await.unwrap();
    assert_eq!(titles(&movies), vec!["Dune", "Alien"]);
  }

  #[tokio::test]
  async fn test_older_read_finishing_last_does_not_overwrite_newer_list() {
    let (client, store) = gated_setup(vec![stored("a", "Alien", 1)]);
    client.list_movies().await.unwrap();

    client.refresh();
    let open_older = store.hold_next_read();
    let older = spawn_list(&client);
    store.read_taken.notified().await;

    client.create_movie(dune()).await.unwrap();
    let open_newer = store.hold_next_read();
    let newer = spawn_list(&client);
    store.read_taken.notified().await;

    open_newer.send(()).unwrap();
    let newest = newer.await.unwrap().unwrap();
    assert_eq!(titles(&newest), vec!["Dune", "Alien"]);
    assert_eq!(client.list_state(), CacheState::Fresh);

    open_older.send(()).unwrap();
    let outdated = older.await.unwrap().unwrap();
    assert_eq!(titles(&outdated), vec!["Alien"]);

    assert_eq!(client.list_state(), CacheState::Fresh);
    let cached = client.list_movies().await.unwrap();
    assert_eq!(titles(&cached), vec!["Dune", "Alien"]);
  }
}
