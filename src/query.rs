//! Async query and mutation handles for views.
//!
//! Inspired by TanStack Query: a `Query<T>` owns a fetcher and its loading
//! state, a `Mutation<T>` tracks one write at a time. Both spawn the work on
//! the runtime and are polled from the view's tick, so rendering never waits
//! on the network.
//!
//! # Example
//!
//! ```ignore
//! let movies = client.clone();
//! let mut query = Query::new(move || {
//!     let movies = movies.clone();
//!     async move { movies.list_movies().await.map_err(|e| e.to_string()) }
//! });
//!
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//! ```

use futures::future::BoxFuture;
use std::future::Future;
use tokio::sync::oneshot;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Query is currently fetching data
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

/// A factory function that creates futures for fetching data
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T, String>> + Send + Sync>;

/// Async query for data fetching with state management.
///
/// Data from the last successful fetch stays available while a refetch is
/// in flight, so a list does not blank out when it is refreshed.
pub struct Query<T> {
  state: QueryState<T>,
  last_data: Option<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<oneshot::Receiver<Result<T, String>>>,
}

impl<T: Clone + Send + 'static> Query<T> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is called each time `fetch()` or `refetch()` starts a request.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      last_data: None,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
    }
  }

  /// Get the current state of the query.
  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  /// Data from the latest successful fetch, even while refetching.
  pub fn data(&self) -> Option<&T> {
    self.state.data().or(self.last_data.as_ref())
  }

  /// Check if the query is currently loading.
  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  /// Check if the query failed.
  pub fn is_error(&self) -> bool {
    self.state.is_error()
  }

  /// Get the error message if the query failed.
  pub fn error(&self) -> Option<&str> {
    self.state.error()
  }

  /// Start fetching data if not already loading.
  pub fn fetch(&mut self) {
    if self.state.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Force a refetch, discarding the result of any pending fetch.
  pub fn refetch(&mut self) {
    self.receiver = None;
    self.start_fetch();
  }

  /// Poll for results from a pending fetch.
  ///
  /// Returns `true` if the state changed (data arrived or error occurred).
  pub fn poll(&mut self) -> bool {
    let Some(receiver) = &mut self.receiver else {
      return false;
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.last_data = Some(data.clone());
        self.state = QueryState::Success(data);
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error);
        self.receiver = None;
        true
      }
      Err(oneshot::error::TryRecvError::Empty) => false,
      Err(oneshot::error::TryRecvError::Closed) => {
        self.state = QueryState::Error("Query was cancelled".to_string());
        self.receiver = None;
        true
      }
    }
  }

  fn start_fetch(&mut self) {
    let (tx, rx) = oneshot::channel();
    self.receiver = Some(rx);
    if let QueryState::Success(data) = std::mem::replace(&mut self.state, QueryState::Loading) {
      self.last_data = Some(data);
    }

    let future = (self.fetcher)();
    tokio::spawn(async move {
      // Receiver may have been dropped by a refetch or by leaving the view
      let _ = tx.send(future.await);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field("pending", &self.receiver.is_some())
      .finish_non_exhaustive()
  }
}

/// The state of a mutation
#[derive(Debug, Clone, PartialEq)]
pub enum MutationState<T> {
  Idle,
  Pending,
  Success(T),
  Error(String),
}

/// Tracks a single write started from a view.
///
/// Unlike a query, the future is supplied per call, since each write carries
/// its own payload.
pub struct Mutation<T> {
  state: MutationState<T>,
  receiver: Option<oneshot::Receiver<Result<T, String>>>,
}

impl<T> Default for Mutation<T> {
  fn default() -> Self {
    Self {
      state: MutationState::Idle,
      receiver: None,
    }
  }
}

impl<T: Send + 'static> Mutation<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn state(&self) -> &MutationState<T> {
    &self.state
  }

  pub fn is_pending(&self) -> bool {
    matches!(self.state, MutationState::Pending)
  }

  /// Start a write. Ignored while another write is pending.
  pub fn mutate<Fut>(&mut self, write: Fut)
  where
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    if self.is_pending() {
      return;
    }

    let (tx, rx) = oneshot::channel();
    self.receiver = Some(rx);
    self.state = MutationState::Pending;

    tokio::spawn(async move {
      let _ = tx.send(write.await);
    });
  }

  /// Poll for the outcome of a pending write.
  ///
  /// Returns `true` if the write just finished.
  pub fn poll(&mut self) -> bool {
    let Some(receiver) = &mut self.receiver else {
      return false;
    };

    let outcome = match receiver.try_recv() {
      Ok(result) => result,
      Err(oneshot::error::TryRecvError::Empty) => return false,
      Err(oneshot::error::TryRecvError::Closed) => Err("Mutation was cancelled".to_string()),
    };

    self.receiver = None;
    self.state = match outcome {
      Ok(value) => MutationState::Success(value),
      Err(error) => MutationState::Error(error),
    };
    true
  }
}
