//! Serde types matching PostgREST wire payloads.

use serde::Deserialize;

/// Media type asking PostgREST for a single JSON object instead of an array.
pub const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Ask PostgREST to echo written rows back.
pub const RETURN_REPRESENTATION: &str = "return=representation";

/// Error object returned by PostgREST on failure.
#[derive(Debug, Deserialize)]
pub struct ApiError {
  #[serde(default)]
  pub code: Option<String>,
  #[serde(default)]
  pub message: String,
  #[serde(default)]
  #[allow(dead_code)]
  pub details: Option<String>,
  #[serde(default)]
  #[allow(dead_code)]
  pub hint: Option<String>,
}

/// Sort direction for a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
  pub column: &'static str,
  pub ascending: bool,
}

impl OrderBy {
  pub const fn desc(column: &'static str) -> Self {
    Self {
      column,
      ascending: false,
    }
  }

  /// Render as a PostgREST `order` parameter value.
  pub fn to_param(self) -> String {
    let direction = if self.ascending { "asc" } else { "desc" };
    format!("{}.{}", self.column, direction)
  }
}

/// Equality filter on a single column, rendered as `column=eq.value`.
#[derive(Debug, Clone, Copy)]
pub struct EqFilter<'a> {
  pub column: &'static str,
  pub value: &'a str,
}

impl<'a> EqFilter<'a> {
  pub fn id(value: &'a str) -> Self {
    Self { column: "id", value }
  }
}
