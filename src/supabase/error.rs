//! The single error kind returned by every store operation.

use reqwest::StatusCode;

use super::api_types::ApiError;

/// Failure reported by the store or by the transport talking to it.
///
/// `Display` is the store's message verbatim so it can be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RemoteError {
  /// Human-readable message from the store client
  pub message: String,
  /// PostgREST/Postgres error code (e.g. "PGRST116", "23505")
  pub code: Option<String>,
  /// HTTP status, when a response was received
  pub status: Option<u16>,
}

impl RemoteError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
      code: None,
      status: None,
    }
  }

  pub fn with_code(mut self, code: impl Into<String>) -> Self {
    self.code = Some(code.into());
    self
  }

  /// Build an error from a non-success response body.
  ///
  /// Prefers the `message` of a PostgREST error object, then the raw body,
  /// then the status reason.
  pub fn from_response(status: StatusCode, body: &str) -> Self {
    let (message, code) = match serde_json::from_str::<ApiError>(body) {
      Ok(api) if !api.message.is_empty() => (api.message, api.code),
      _ if !body.trim().is_empty() => (body.trim().to_string(), None),
      _ => (
        status
          .canonical_reason()
          .map(String::from)
          .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        None,
      ),
    };

    let err = Self {
      status: Some(status.as_u16()),
      ..Self::new(message)
    };
    match code {
      Some(code) => err.with_code(code),
      None => err,
    }
  }
}

impl From<reqwest::Error> for RemoteError {
  fn from(err: reqwest::Error) -> Self {
    Self {
      message: err.to_string(),
      code: None,
      status: err.status().map(|s| s.as_u16()),
    }
  }
}
