use std::sync::Arc;

use http::HeaderMap;
use serde::Deserialize;
use tracing::debug;

use crate::{
  client::ApiClient,
  config::{self, EnvLookup},
  error::{ApiError, ConfigError, ServiceError},
  headers::{IdentityHeaders, merge_headers},
};

/// API stub bound to a configured [`ApiClient`].
pub trait Api: Sized {
  fn new(client: ApiClient) -> Self;

  fn api_client(&self) -> &ApiClient;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Status {
  pub api_version: u32,
  #[serde(default)]
  pub commit: Option<String>,
}

/// `GET /status/` of the RBAC service.
#[derive(Debug, Clone)]
pub struct StatusApi {
  client: ApiClient,
}

impl StatusApi {
  pub async fn get_status(&self) -> Result<Status, ApiError> {
    self.client.get("status/", &[]).await
  }
}

impl Api for StatusApi {
  fn new(client: ApiClient) -> Self {
    Self { client }
  }

  fn api_client(&self) -> &ApiClient {
    &self.client
  }
}

/// Invokes RBAC API stubs on behalf of the request that `identity` came from.
///
/// The base URL is read from `RBAC_URL` on every call, so a missing setting
/// surfaces as [`ServiceError::Configuration`] at call time.
#[derive(Clone)]
pub struct RbacService<I> {
  identity: I,
  env: EnvLookup,
}

impl<I: std::fmt::Debug> std::fmt::Debug for RbacService<I> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RbacService")
      .field("identity", &self.identity)
      .finish_non_exhaustive()
  }
}

impl<I: IdentityHeaders> RbacService<I> {
  pub fn new(identity: I) -> Self {
    Self {
      identity,
      env: config::process_env(),
    }
  }

  /// Replaces the process environment as the source of `RBAC_URL`.
  #[must_use]
  pub fn with_env(mut self, env: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
    self.env = Arc::new(env);
    self
  }

  /// Client for the configured base URL, sending the identity headers
  /// overlaid with `extra_headers`.
  pub fn client(&self, extra_headers: &HeaderMap) -> Result<ApiClient, ConfigError> {
    let base_url = config::base_url(self.env.as_ref())?;
    let headers = merge_headers(self.identity.forwardable_headers(), extra_headers);
    ApiClient::new(base_url, headers)
  }

  /// Runs `block` against a fresh `A` and classifies its failure.
  ///
  /// An [`ApiError`] with a nonzero code is returned unchanged as
  /// [`ServiceError::Api`], code `0` becomes [`ServiceError::Network`] and a
  /// missing code [`ServiceError::TimedOut`]. Other error types convert through
  /// their own `From` impl. The API instance is dropped before returning.
  pub async fn call<A, F, T, E>(&self, extra_headers: HeaderMap, block: F) -> Result<T, ServiceError>
  where
    A: Api,
    F: AsyncFnOnce(&A) -> Result<T, E>,
    ServiceError: From<E>,
  {
    let api = A::new(self.client(&extra_headers)?);
    debug!(base_url = %api.api_client().base_url(), "calling RBAC service");
    let result = block(&api).await;
    drop(api);
    result.map_err(ServiceError::from)
  }
}
