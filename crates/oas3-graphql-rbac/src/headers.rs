use std::collections::BTreeMap;

use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

/// Header carrying the caller's encoded identity.
pub const IDENTITY_HEADER: HeaderName = HeaderName::from_static("x-rh-identity");
/// Header correlating a request across services.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-rh-insights-request-id");

/// Request context that supplies the headers forwarded to downstream services.
pub trait IdentityHeaders {
  fn forwardable_headers(&self) -> HeaderMap;
}

/// Incoming request headers: only identity and request-id are forwarded.
impl IdentityHeaders for HeaderMap {
  fn forwardable_headers(&self) -> HeaderMap {
    let mut forwarded = HeaderMap::new();
    for name in [IDENTITY_HEADER, REQUEST_ID_HEADER] {
      for value in self.get_all(&name) {
        forwarded.append(name.clone(), value.clone());
      }
    }
    forwarded
  }
}

/// Headers already selected by the caller: every valid entry is forwarded.
impl IdentityHeaders for BTreeMap<String, String> {
  fn forwardable_headers(&self) -> HeaderMap {
    let mut forwarded = HeaderMap::new();
    for (name, value) in self {
      match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
        (Ok(name), Ok(value)) => {
          forwarded.insert(name, value);
        }
        _ => debug!(header = %name, "invalid header; not forwarded"),
      }
    }
    forwarded
  }
}

/// Identity headers overlaid with `extra`; a name present in `extra` replaces
/// every identity value of that name.
pub fn merge_headers(mut identity: HeaderMap, extra: &HeaderMap) -> HeaderMap {
  for name in extra.keys() {
    identity.remove(name);
    for value in extra.get_all(name) {
      identity.append(name.clone(), value.clone());
    }
  }
  identity
}
