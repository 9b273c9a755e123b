use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Genres offered by the movie form
pub const GENRES: &[&str] = &[
  "Action",
  "Adventure",
  "Comedy",
  "Drama",
  "Horror",
  "Romance",
  "Sci-Fi",
  "Thriller",
  "Documentary",
  "Animation",
];

pub const STATUS_AVAILABLE: &str = "available";
pub const STATUS_RENTED: &str = "rented";

/// Availability values offered by the movie form
pub const AVAILABILITY_STATUSES: &[&str] = &[STATUS_AVAILABLE, STATUS_RENTED];

/// A row of the movies table.
///
/// `genre` and `availability_status` are plain strings: the store does not
/// constrain them and neither does this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
  pub id: String,
  pub title: String,
  pub description: Option<String>,
  pub genre: String,
  pub release_year: i32,
  pub availability_status: String,
  pub rental_price: f64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Insert payload. Store-assigned fields are absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMovie {
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub genre: String,
  pub release_year: i32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub availability_status: Option<String>,
  pub rental_price: f64,
}

/// Partial update payload. Only fields that are `Some` are sent.
///
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MovieChanges {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub genre: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub release_year: Option<i32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub availability_status: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub rental_price: Option<f64>,
}

#[cfg(test)]
impl MovieChanges {
  pub fn rental_price(price: f64) -> Self {
    Self {
      rental_price: Some(price),
      ..Self::default()
    }
  }

  pub fn availability_status(status: &str) -> Self {
    Self {
      availability_status: Some(status.to_string()),
      ..Self::default()
    }
  }

  pub fn is_empty(&self) -> bool {
    *self == Self::default()
  }

  /// Apply these changes to a local copy of a row.
  pub fn apply_to(&self, movie: &mut Movie) {
    if let Some(title) = &self.title {
      movie.title = title.clone();
    }
    if let Some(description) = &self.description {
      movie.description = description.clone();
    }
    if let Some(genre) = &self.genre {
      movie.genre = genre.clone();
    }
    if let Some(year) = self.release_year {
      movie.release_year = year;
    }
    if let Some(status) = &self.availability_status {
      movie.availability_status = status.clone();
    }
    if let Some(price) = self.rental_price {
      movie.rental_price = price;
    }
  }
}
