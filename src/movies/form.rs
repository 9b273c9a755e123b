//! Editable movie draft and the input checks the form applies before writing.
//!
//! These checks are a convenience for the person typing. The store accepts
//! anything its column types allow, and the data access layer does not repeat
//! them.

use chrono::{Datelike, Utc};
use std::fmt;

use super::types::{Movie, MovieChanges, NewMovie, AVAILABILITY_STATUSES, GENRES, STATUS_AVAILABLE};

/// Earliest release year the form accepts
pub const MIN_RELEASE_YEAR: i32 = 1900;

/// How far into the future a release year may be
pub const MAX_YEARS_AHEAD: i32 = 5;

pub fn current_year() -> i32 {
  Utc::now().year()
}

/// Form fields, in focus order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  Title,
  Description,
  Genre,
  ReleaseYear,
  RentalPrice,
  Availability,
}

impl Field {
  pub const ALL: [Field; 6] = [
    Field::Title,
    Field::Description,
    Field::Genre,
    Field::ReleaseYear,
    Field::RentalPrice,
    Field::Availability,
  ];

  pub fn label(self) -> &'static str {
    match self {
      Field::Title => "Title",
      Field::Description => "Description",
      Field::Genre => "Genre",
      Field::ReleaseYear => "Release Year",
      Field::RentalPrice => "Rental Price ($)",
      Field::Availability => "Availability Status",
    }
  }
}

impl fmt::Display for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct FieldError {
  pub field: Field,
  pub message: String,
}

impl FieldError {
  fn new(field: Field, message: impl Into<String>) -> Self {
    Self {
      field,
      message: message.into(),
    }
  }
}

/// Raw form contents. Numbers stay text until validated.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDraft {
  pub title: String,
  pub description: String,
  /// Empty until a genre is picked
  pub genre: String,
  pub release_year: String,
  pub rental_price: String,
  pub availability_status: String,
}

/// A draft that passed every check, ready to become a write payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDraft {
  title: String,
  description: Option<String>,
  genre: String,
  release_year: i32,
  rental_price: f64,
  availability_status: String,
}

impl MovieDraft {
  /// Blank draft for a new movie
  pub fn new(current_year: i32) -> Self {
    Self {
      title: String::new(),
      description: String::new(),
      genre: String::new(),
      release_year: current_year.to_string(),
      rental_price: "0".to_string(),
      availability_status: STATUS_AVAILABLE.to_string(),
    }
  }

  /// Draft pre-filled from an existing movie
  pub fn from_movie(movie: &Movie) -> Self {
    Self {
      title: movie.title.clone(),
      description: movie.description.clone().unwrap_or_default(),
      genre: movie.genre.clone(),
      release_year: movie.release_year.to_string(),
      rental_price: format_price(movie.rental_price),
      availability_status: movie.availability_status.clone(),
    }
  }

  /// Move the genre one step through [`GENRES`], wrapping around.
  pub fn cycle_genre(&mut self, forward: bool) {
    self.genre = cycle(GENRES, &self.genre, forward).to_string();
  }

  /// Move the availability one step through [`AVAILABILITY_STATUSES`].
  pub fn cycle_availability(&mut self, forward: bool) {
    self.availability_status = cycle(AVAILABILITY_STATUSES, &self.availability_status, forward).to_string();
  }

  /// Check every field. On failure returns every problem, in field order.
  pub fn validate(&self, current_year: i32) -> Result<ValidDraft, Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = self.title.trim();
    if title.is_empty() {
      errors.push(FieldError::new(Field::Title, "is required"));
    }

    if !GENRES.contains(&self.genre.as_str()) {
      errors.push(FieldError::new(Field::Genre, "select a genre"));
    }

    let max_year = current_year + MAX_YEARS_AHEAD;
    let release_year = match self.release_year.trim().parse::<i32>() {
      Ok(year) if (MIN_RELEASE_YEAR..=max_year).contains(&year) => year,
      Ok(_) => {
        errors.push(FieldError::new(
          Field::ReleaseYear,
          format!("must be between {} and {}", MIN_RELEASE_YEAR, max_year),
        ));
        0
      }
      Err(_) => {
        errors.push(FieldError::new(Field::ReleaseYear, "must be a whole number"));
        0
      }
    };

    let rental_price = match parse_price(&self.rental_price) {
      Ok(price) => price,
      Err(message) => {
        errors.push(FieldError::new(Field::RentalPrice, message));
        0.0
      }
    };

    if !AVAILABILITY_STATUSES.contains(&self.availability_status.as_str()) {
      errors.push(FieldError::new(
        Field::Availability,
        "must be available or rented",
      ));
    }

    if !errors.is_empty() {
      return Err(errors);
    }

    let description = self.description.trim();
    Ok(ValidDraft {
      title: title.to_string(),
      description: (!description.is_empty()).then(|| description.to_string()),
      genre: self.genre.clone(),
      release_year,
      rental_price,
      availability_status: self.availability_status.clone(),
    })
  }
}

impl ValidDraft {
  /// Insert payload
  pub fn into_new_movie(self) -> NewMovie {
    NewMovie {
      title: self.title,
      description: self.description,
      genre: self.genre,
      release_year: self.release_year,
      availability_status: Some(self.availability_status),
      rental_price: self.rental_price,
    }
  }

  /// Update payload carrying every form field. An empty description clears
  /// the stored one.
  pub fn into_changes(self) -> MovieChanges {
    MovieChanges {
      title: Some(self.title),
      description: Some(self.description),
      genre: Some(self.genre),
      release_year: Some(self.release_year),
      availability_status: Some(self.availability_status),
      rental_price: Some(self.rental_price),
    }
  }
}

fn cycle<'a>(options: &[&'a str], current: &str, forward: bool) -> &'a str {
  let len = options.len();
  let next = match options.iter().position(|o| *o == current) {
    Some(i) if forward => (i + 1) % len,
    Some(i) => (i + len - 1) % len,
    None if forward => 0,
    None => len - 1,
  };
  options[next]
}

fn parse_price(input: &str) -> Result<f64, &'static str> {
  let input = input.trim();
  let price: f64 = input.parse().map_err(|_| "must be a number")?;

  if !price.is_finite() || price < 0.0 {
    return Err("must be zero or more");
  }
  if input.split_once('.').is_some_and(|(_, cents)| cents.len() > 2) {
    return Err("use at most two decimal places");
  }

  Ok(price)
}

/// Render a price with two decimals
pub fn format_price(price: f64) -> String {
  format!("{:.2}", price)
}
