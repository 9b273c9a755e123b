use color_eyre::{eyre::eyre, Result};
use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::config::SupabaseConfig;

use super::api_types::{EqFilter, OrderBy, RETURN_REPRESENTATION, SINGLE_OBJECT};
use super::error::RemoteError;

/// PostgREST client bound to a single table of a Supabase project.
///
/// Row types are supplied by the caller; this client only shapes requests
/// and turns failed responses into [`RemoteError`].
#[derive(Clone)]
pub struct TableClient {
  http: reqwest::Client,
  endpoint: Url,
  api_key: String,
  schema: Option<String>,
}

impl TableClient {
  pub fn new(config: &SupabaseConfig, table: &str, api_key: String) -> Result<Self> {
    let mut endpoint = Url::parse(&config.url)
      .map_err(|e| eyre!("Invalid Supabase URL {}: {}", config.url, e))?;

    endpoint
      .path_segments_mut()
      .map_err(|_| eyre!("Supabase URL cannot be used as a base: {}", config.url))?
      .pop_if_empty()
      .extend(["rest", "v1", table]);
    endpoint.set_query(None);

    let http = reqwest::Client::builder()
      .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      endpoint,
      api_key,
      schema: config.schema.clone(),
    })
  }

  /// Table endpoint (`{project}/rest/v1/{table}`)
  pub fn endpoint(&self) -> &Url {
    &self.endpoint
  }

  /// Fetch every row of the table in the given order.
  pub async fn select_all<T: DeserializeOwned>(&self, order: OrderBy) -> Result<Vec<T>, RemoteError> {
    let response = send(self.select_request(order)).await?;
    Ok(response.json().await?)
  }

  /// Insert one row and return it as stored.
  pub async fn insert_one<B, T>(&self, row: &B) -> Result<T, RemoteError>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let response = send(self.insert_request(row)).await?;
    Ok(response.json().await?)
  }

  /// Patch the single row matching `filter` and return it as stored.
  ///
  /// The store answers with an error when no row matches.
  pub async fn update_one<B, T>(&self, filter: EqFilter<'_>, patch: &B) -> Result<T, RemoteError>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let response = send(self.update_request(filter, patch)).await?;
    Ok(response.json().await?)
  }

  /// Delete the rows matching `filter`.
  pub async fn delete(&self, filter: EqFilter<'_>) -> Result<(), RemoteError> {
    send(self.delete_request(filter)).await?;
    Ok(())
  }

  fn request(&self, method: Method, write: bool) -> RequestBuilder {
    let mut builder = self
      .http
      .request(method, self.endpoint.clone())
      .header("apikey", &self.api_key)
      .bearer_auth(&self.api_key);

    if let Some(schema) = &self.schema {
      let header = if write {
        "Content-Profile"
      } else {
        "Accept-Profile"
      };
      builder = builder.header(header, schema);
    }

    builder
  }

  fn select_request(&self, order: OrderBy) -> RequestBuilder {
    let order = order.to_param();
    self
      .request(Method::GET, false)
      .query(&[("select", "*"), ("order", order.as_str())])
  }

  fn insert_request<B: Serialize + ?Sized>(&self, row: &B) -> RequestBuilder {
    self
      .request(Method::POST, true)
      .header("Prefer", RETURN_REPRESENTATION)
      .header("Accept", SINGLE_OBJECT)
      .json(&[row])
  }

  fn update_request<B: Serialize + ?Sized>(&self, filter: EqFilter<'_>, patch: &B) -> RequestBuilder {
    self
      .request(Method::PATCH, true)
      .query(&[(filter.column, eq(filter.value))])
      .header("Prefer", RETURN_REPRESENTATION)
      .header("Accept", SINGLE_OBJECT)
      .json(patch)
  }

  fn delete_request(&self, filter: EqFilter<'_>) -> RequestBuilder {
    self
      .request(Method::DELETE, true)
      .query(&[(filter.column, eq(filter.value))])
  }
}

fn eq(value: &str) -> String {
  format!("eq.{}", value)
}

/// Send a request, turning any non-success status into a [`RemoteError`].
async fn send(builder: RequestBuilder) -> Result<Response, RemoteError> {
  let response = builder.send().await?;
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  let body = response.text().await.unwrap_or_default();
  let err = RemoteError::from_response(status, &body);
  tracing::debug!(status = status.as_u16(), code = ?err.code, "store rejected request");
  Err(err)
}
