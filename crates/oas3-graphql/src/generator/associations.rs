//! Association discovery over the OpenAPI path table.
//!
//! A collection is *associated* when some other resource exposes it as a nested
//! sub-collection (`/orgs/{org_id}/accounts`). Its *associations* are the nested
//! sub-collections it exposes itself (`/accounts/{account_id}/widgets`) that are
//! also addressable on their own (`/widgets/{widget_id}`).

use std::collections::{BTreeMap, BTreeSet};

use oas3::spec::PathItem;
use regex::Regex;

/// Matches an id path parameter such as `{id}`, `{org_id}` or `{source_type_id}`.
pub(crate) const ID_PARAMETER: &str = r"\{[a-z_*]*id\}";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceAssociations {
  pub is_associated: bool,
  pub associations: BTreeSet<String>,
}

/// Resolves the association flags of `collection` from `paths`.
///
/// Only paths defining a GET operation count. The parent of an associated
/// collection is exactly one segment deep (`/<parent>/{..._id}/<collection>`).
pub fn resource_associations(paths: &BTreeMap<String, PathItem>, collection: &str) -> ResourceAssociations {
  let escaped = regex::escape(collection);
  let (Ok(nested_re), Ok(sub_re)) = (
    Regex::new(&format!(r"^/[^/]*/{ID_PARAMETER}/{escaped}$")),
    Regex::new(&format!(r"^/{escaped}/{ID_PARAMETER}/([^/]*)$")),
  ) else {
    return ResourceAssociations::default();
  };

  let is_associated = paths
    .iter()
    .any(|(path, item)| item.get.is_some() && nested_re.is_match(path));

  let associations = paths
    .keys()
    .filter_map(|path| sub_re.captures(path))
    .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
    .filter(|sub| has_singular_get(paths, sub))
    .collect();

  ResourceAssociations {
    is_associated,
    associations,
  }
}

fn has_singular_get(paths: &BTreeMap<String, PathItem>, collection: &str) -> bool {
  let Ok(singular_re) = Regex::new(&format!(r"^/{}/{ID_PARAMETER}$", regex::escape(collection))) else {
    return false;
  };
  paths
    .iter()
    .any(|(path, item)| item.get.is_some() && singular_re.is_match(path))
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn path_table(value: serde_json::Value) -> BTreeMap<String, PathItem> {
    serde_json::from_value(value).unwrap()
  }

  fn get() -> serde_json::Value {
    json!({ "get": { "responses": { "200": { "description": "ok" } } } })
  }

  fn post() -> serde_json::Value {
    json!({ "post": { "responses": { "201": { "description": "created" } } } })
  }

  #[test]
  fn test_nested_collection_is_associated() {
    let paths = path_table(json!({
      "/orgs/{org_id}/accounts": get(),
      "/accounts/{account_id}": get(),
    }));

    let result = resource_associations(&paths, "accounts");
    assert!(result.is_associated);
    assert!(result.associations.is_empty());
  }

  #[test]
  fn test_nested_collection_requires_get() {
    let paths = path_table(json!({
      "/orgs/{org_id}/accounts": post(),
      "/accounts/{id}": get(),
    }));

    assert!(!resource_associations(&paths, "accounts").is_associated);
  }

  #[test]
  fn test_nested_collection_needs_single_prefix_segment() {
    let paths = path_table(json!({
      "/api/orgs/{org_id}/accounts": get(),
      "/orgs/{orgId}/accounts": get(),
    }));

    assert!(!resource_associations(&paths, "accounts").is_associated);
  }

  #[test]
  fn test_sub_collections_sorted_and_deduplicated() {
    let paths = path_table(json!({
      "/accounts/{account_id}/widgets": get(),
      "/accounts/{id}/widgets": get(),
      "/accounts/{account_id}/gadgets": get(),
      "/accounts/{account_id}/orphans": get(),
      "/widgets/{widget_id}": get(),
      "/gadgets/{id}": get(),
      "/orphans": get(),
    }));

    let result = resource_associations(&paths, "accounts");
    assert!(!result.is_associated);
    assert_eq!(result.associations.into_iter().collect::<Vec<_>>(), ["gadgets", "widgets"]);
  }

  #[test]
  fn test_sub_collection_target_needs_get() {
    let paths = path_table(json!({
      "/accounts/{account_id}/widgets": get(),
      "/widgets/{widget_id}": post(),
    }));

    assert!(resource_associations(&paths, "accounts").associations.is_empty());
  }

  #[test]
  fn test_collection_name_is_matched_literally() {
    let paths = path_table(json!({
      "/orgs/{org_id}/accountsXjson": get(),
      "/a.b/{id}/widgets": get(),
      "/widgets/{id}": get(),
    }));

    assert!(!resource_associations(&paths, "accounts.json").is_associated);
    assert!(resource_associations(&paths, "axb").associations.is_empty());
    assert_eq!(resource_associations(&paths, "a.b").associations.len(), 1);
  }
}
