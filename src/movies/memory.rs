//! In-process [`MovieStore`] used by tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::supabase::{OrderBy, RemoteError};

use super::store::MovieStore;
use super::types::{Movie, MovieChanges, NewMovie, STATUS_AVAILABLE};

#[derive(Default)]
struct State {
  rows: Vec<Movie>,
  next_id: u64,
  clock: i64,
  failure: Option<String>,
}

/// Emulates the parts of the hosted table the app relies on: store-assigned
/// ids and timestamps, ordering, single-row updates and injected failures.
#[derive(Default)]
pub struct MemoryMovieStore {
  state: Mutex<State>,
  calls: AtomicUsize,
}

impl MemoryMovieStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Seed the table with existing rows.
  pub fn with_rows(rows: Vec<Movie>) -> Self {
    let store = Self::new();
    {
      let mut state = store.state.lock().unwrap();
      state.next_id = rows.len() as u64;
      state.clock = rows
        .iter()
        .map(|m| (m.updated_at - epoch()).num_seconds())
        .max()
        .unwrap_or(0);
      state.rows = rows;
    }
    store
  }

  /// Make every following call fail with `message` until [`recover`](Self::recover).
  pub fn fail_with(&self, message: &str) {
    self.state.lock().unwrap().failure = Some(message.to_string());
  }

  pub fn recover(&self) {
    self.state.lock().unwrap().failure = None;
  }

  /// Number of store calls made so far, failed ones included.
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  fn begin(&self) -> Result<std::sync::MutexGuard<'_, State>, RemoteError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let state = self.state.lock().unwrap();
    if let Some(message) = state.failure.clone() {
      return Err(RemoteError::new(message));
    }
    Ok(state)
  }
}

impl State {
  fn tick(&mut self) -> DateTime<Utc> {
    self.clock += 1;
    epoch() + Duration::seconds(self.clock)
  }
}

fn epoch() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Build a stored row with a fixed creation time, for seeding.
pub fn stored(id: &str, title: &str, created_offset_secs: i64) -> Movie {
  let created_at = epoch() + Duration::seconds(created_offset_secs);
  Movie {
    id: id.to_string(),
    title: title.to_string(),
    description: None,
    genre: "Drama".to_string(),
    release_year: 2000,
    availability_status: STATUS_AVAILABLE.to_string(),
    rental_price: 2.99,
    created_at,
    updated_at: created_at,
  }
}

#[async_trait]
impl MovieStore for MemoryMovieStore {
  async fn select(&self, order: OrderBy) -> Result<Vec<Movie>, RemoteError> {
    let state = self.begin()?;
    let mut rows = state.rows.clone();
    match order.column {
      "created_at" => rows.sort_by_key(|m| m.created_at),
      "updated_at" => rows.sort_by_key(|m| m.updated_at),
      "title" => rows.sort_by(|a, b| a.title.cmp(&b.title)),
      "release_year" => rows.sort_by_key(|m| m.release_year),
      other => {
        return Err(
          RemoteError::new(format!("column movies.{} does not exist", other)).with_code("42703"),
        )
      }
    }
    if !order.ascending {
      rows.reverse();
    }
    Ok(rows)
  }

  async fn insert(&self, row: &NewMovie) -> Result<Movie, RemoteError> {
    let mut state = self.begin()?;
    state.next_id += 1;
    let id = format!("movie-{}", state.next_id);
    let now = state.tick();

    let movie = Movie {
      id,
      title: row.title.clone(),
      description: row.description.clone(),
      genre: row.genre.clone(),
      release_year: row.release_year,
      availability_status: row
        .availability_status
        .clone()
        .unwrap_or_else(|| STATUS_AVAILABLE.to_string()),
      rental_price: row.rental_price,
      created_at: now,
      updated_at: now,
    };
    state.rows.push(movie.clone());
    Ok(movie)
  }

  async fn update(&self, id: &str, changes: &MovieChanges) -> Result<Movie, RemoteError> {
    let mut state = self.begin()?;
    let now = state.tick();
    let movie = state
      .rows
      .iter_mut()
      .find(|m| m.id == id)
      .ok_or_else(|| {
        RemoteError::new("JSON object requested, multiple (or no) rows returned")
          .with_code("PGRST116")
      })?;

    changes.apply_to(movie);
    movie.updated_at = now;
    Ok(movie.clone())
  }

  async fn delete(&self, id: &str) -> Result<(), RemoteError> {
    let mut state = self.begin()?;
    state.rows.retain(|m| m.id != id);
    Ok(())
  }
}
