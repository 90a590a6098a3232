use std::time::Duration;

use http::HeaderMap;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ApiError, ConfigError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client bound to one service base URL, sending a fixed set of default
/// headers with every request.
#[derive(Debug, Clone)]
pub struct ApiClient {
  client: Client,
  base_url: Url,
  default_headers: HeaderMap,
}

impl ApiClient {
  pub fn new(base_url: Url, default_headers: HeaderMap) -> Result<Self, ConfigError> {
    Self::with_timeout(base_url, default_headers, DEFAULT_TIMEOUT)
  }

  pub fn with_timeout(mut base_url: Url, default_headers: HeaderMap, timeout: Duration) -> Result<Self, ConfigError> {
    if !base_url.path().ends_with('/') {
      let path = format!("{}/", base_url.path());
      base_url.set_path(&path);
    }
    let client = Client::builder()
      .default_headers(default_headers.clone())
      .timeout(timeout)
      .build()
      .map_err(ConfigError::HttpClient)?;
    Ok(Self {
      client,
      base_url,
      default_headers,
    })
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  pub fn default_headers(&self) -> &HeaderMap {
    &self.default_headers
  }

  /// Resolves `path` against the base URL and appends `query`.
  pub fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
    let mut url = self
      .base_url
      .join(path.trim_start_matches('/'))
      .map_err(|err| ApiError::new(Some(0), format!("invalid request path '{path}': {err}")))?;
    if !query.is_empty() {
      let mut pairs = url.query_pairs_mut();
      for (key, value) in query {
        pairs.append_pair(key, value);
      }
    }
    Ok(url)
  }

  /// GETs `path` and decodes the JSON body.
  ///
  /// Non-success statuses become an [`ApiError`] carrying that status; failures
  /// before a response arrives follow the code conventions of [`ApiError`].
  pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
    let url = self.url(path, query)?;
    let response = self.client.get(url).send().await?;
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
      return Err(
        ApiError::new(Some(status.as_u16()), format!("request failed with status {status}"))
          .with_response_body(String::from_utf8_lossy(&body)),
      );
    }
    decode_body(status.as_u16(), &body)
  }
}

fn decode_body<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, ApiError> {
  let mut de = serde_json::Deserializer::from_slice(body);
  serde_path_to_error::deserialize(&mut de).map_err(|err| {
    let path = err.path().to_string();
    ApiError::new(
      Some(status),
      format!("invalid response body at path {path}: {}", err.into_inner()),
    )
    .with_response_body(String::from_utf8_lossy(body))
  })
}
