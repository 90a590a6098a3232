use std::sync::LazyLock;

use regex::Regex;

use crate::generator::associations::ID_PARAMETER;

/// `(optional prefix)/<collection>/{..._id}`
static COLLECTION_PATH_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(&format!(r"^/(.*/)?([^/{{][^/]*)/{ID_PARAMETER}$")).unwrap());

static GRAPHQL_NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").unwrap());

/// Whether `name` can be used verbatim as a GraphQL field or type name.
pub fn is_graphql_name(name: &str) -> bool {
  GRAPHQL_NAME_RE.is_match(name)
}

/// Namespace tag for an API version: `3.1` becomes `V3x1`.
pub fn namespace_tag(api_version: &str) -> String {
  format!("V{}", api_version.replace('.', "x"))
}

/// Singular, upper camel-cased type name of a collection: `source_types` becomes `SourceType`.
pub fn class_name(collection: &str) -> String {
  cruet::to_class_case(collection)
}

/// Collection addressed by a singular resource path such as `/api/v1/sources/{id}`.
pub fn collection_from_path(path: &str) -> Option<&str> {
  COLLECTION_PATH_RE
    .captures(path)
    .and_then(|caps| caps.get(2))
    .map(|m| m.as_str())
}

/// Name of the paginated wrapper type generated for a collection type.
pub(crate) fn collection_type_name(class_name: &str) -> String {
  format!("{class_name}Collection")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_namespace_tag() {
    assert_eq!(namespace_tag("3.1"), "V3x1");
    assert_eq!(namespace_tag("1.0"), "V1x0");
    assert_eq!(namespace_tag("2"), "V2");
  }

  #[test]
  fn test_class_name() {
    assert_eq!(class_name("accounts"), "Account");
    assert_eq!(class_name("sources"), "Source");
    assert_eq!(class_name("source_types"), "SourceType");
    assert_eq!(class_name("service_offerings"), "ServiceOffering");
  }

  #[test]
  fn test_graphql_names() {
    assert!(is_graphql_name("created_at"));
    assert!(is_graphql_name("_version"));
    assert!(!is_graphql_name("source-type"));
    assert!(!is_graphql_name("2fa"));
    assert!(!is_graphql_name(""));
  }

  #[test]
  fn test_collection_from_path() {
    assert_eq!(collection_from_path("/sources/{id}"), Some("sources"));
    assert_eq!(collection_from_path("/source_types/{source_type_id}"), Some("source_types"));
    assert_eq!(collection_from_path("/api/v1.0/sources/{id}"), Some("sources"));
    assert_eq!(
      collection_from_path("/source_types/{source_type_id}/sources/{id}"),
      Some("sources")
    );
    assert_eq!(collection_from_path("/sources"), None);
    assert_eq!(collection_from_path("/sources/{id}/tags"), None);
    assert_eq!(collection_from_path("/{tenant_id}/{id}"), None);
  }
}
