use std::sync::Arc;

use url::Url;

use crate::error::ConfigError;

/// Environment variable holding the RBAC service base URL.
pub const RBAC_URL_VAR: &str = "RBAC_URL";

/// Looks up an environment setting by name.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Lookup backed by the process environment.
pub fn process_env() -> EnvLookup {
  Arc::new(|var| std::env::var(var).ok())
}

/// Reads and parses the RBAC base URL. Unset and blank values are both missing.
pub fn base_url(lookup: &(dyn Fn(&str) -> Option<String> + Send + Sync)) -> Result<Url, ConfigError> {
  let value = lookup(RBAC_URL_VAR)
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
    .ok_or(ConfigError::MissingBaseUrl { var: RBAC_URL_VAR })?;
  Url::parse(&value).map_err(|source| ConfigError::InvalidBaseUrl { value, source })
}
