use std::fmt;

/// Error reported by an API client call.
///
/// `code` carries the HTTP status of an upstream error response. A code of `0`
/// marks a connection-level failure with no response; no code at all marks a
/// request that timed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
  pub code: Option<u16>,
  pub message: String,
  pub response_body: Option<String>,
}

impl ApiError {
  pub fn new(code: Option<u16>, message: impl Into<String>) -> Self {
    Self {
      code,
      message: message.into(),
      response_body: None,
    }
  }

  #[must_use]
  pub fn with_response_body(mut self, body: impl Into<String>) -> Self {
    self.response_body = Some(body.into());
    self
  }
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.code {
      Some(code) => write!(f, "API error (code {code}): {}", self.message),
      None => write!(f, "API error: {}", self.message),
    }
  }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
  fn from(err: reqwest::Error) -> Self {
    let code = if err.is_timeout() {
      None
    } else {
      Some(err.status().map_or(0, |status| status.as_u16()))
    };
    Self::new(code, err.to_string())
  }
}

/// The service could not be reached: no response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("network error: {message}")]
pub struct NetworkError {
  pub message: String,
}

/// The request did not complete in time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("request timed out: {message}")]
pub struct TimedOutError {
  pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("environment variable {var} is not set")]
  MissingBaseUrl { var: &'static str },

  #[error("invalid base URL '{value}': {source}")]
  InvalidBaseUrl {
    value: String,
    #[source]
    source: url::ParseError,
  },

  #[error("failed to build HTTP client: {0}")]
  HttpClient(#[source] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
  #[error(transparent)]
  Configuration(#[from] ConfigError),

  /// Upstream error response, passed through unchanged.
  #[error(transparent)]
  Api(ApiError),

  #[error(transparent)]
  Network(#[from] NetworkError),

  #[error(transparent)]
  TimedOut(#[from] TimedOutError),

  #[error(transparent)]
  Other(Box<dyn std::error::Error + Send + Sync>),
}

impl From<ApiError> for ServiceError {
  fn from(err: ApiError) -> Self {
    match err.code {
      Some(0) => Self::Network(NetworkError { message: err.message }),
      Some(_) => Self::Api(err),
      None => Self::TimedOut(TimedOutError { message: err.message }),
    }
  }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for ServiceError {
  fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
    match err.downcast::<ApiError>() {
      Ok(api) => Self::from(*api),
      Err(other) => Self::Other(other),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_nonzero_code_is_passed_through() {
    let err = ApiError::new(Some(1), "kaboom").with_response_body("{}");
    match ServiceError::from(err.clone()) {
      ServiceError::Api(api) => assert_eq!(api, err),
      other => panic!("expected Api, got {other:?}"),
    }
    assert!(matches!(
      ServiceError::from(ApiError::new(Some(404), "missing")),
      ServiceError::Api(ApiError { code: Some(404), .. })
    ));
  }

  #[test]
  fn test_zero_code_is_network_error() {
    let err = ServiceError::from(ApiError::new(Some(0), "kaboom"));
    assert!(matches!(err, ServiceError::Network(NetworkError { ref message }) if message == "kaboom"));
  }

  #[test]
  fn test_missing_code_is_timeout() {
    let err = ServiceError::from(ApiError::new(None, "kaboom"));
    assert!(matches!(err, ServiceError::TimedOut(_)));
    assert_eq!(err.to_string(), "request timed out: kaboom");
  }

  #[test]
  fn test_boxed_errors() {
    let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(ApiError::new(Some(0), "refused"));
    assert!(matches!(ServiceError::from(boxed), ServiceError::Network(_)));

    let boxed: Box<dyn std::error::Error + Send + Sync> = "kaboom".into();
    match ServiceError::from(boxed) {
      ServiceError::Other(other) => assert_eq!(other.to_string(), "kaboom"),
      other => panic!("expected Other, got {other:?}"),
    }
  }

  #[test]
  fn test_display() {
    assert_eq!(ApiError::new(Some(500), "boom").to_string(), "API error (code 500): boom");
    assert_eq!(ApiError::new(None, "slow").to_string(), "API error: slow");
  }
}
