use async_graphql_parser::types::{ServiceDocument, TypeSystemDefinition};
use indexmap::IndexMap;
use strum::{Display, EnumString};

use crate::generator::type_mapper::ScalarTag;

/// Shape of the root query accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum GenerationMode {
  /// Accessors return a bare list of records.
  #[default]
  Legacy,
  /// Accessors return a collection wrapper carrying `meta` and `data`.
  #[strum(to_string = "pagination_v2", serialize = "v2")]
  PaginationV2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMeta {
  pub name: String,
  pub graphql_type: ScalarTag,
  pub description: Option<String>,
}

/// Everything known about one collection once its schema has been analysed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectionMeta {
  pub name: String,
  pub class_name: String,
  pub description: Option<String>,
  /// Sorted by property name.
  pub properties: Vec<PropertyMeta>,
  pub field_resolvers: IndexMap<String, String>,
  pub is_associated: bool,
  /// Sorted sub-collection names.
  pub associations: Vec<String>,
}

impl CollectionMeta {
  pub fn property(&self, name: &str) -> Option<&PropertyMeta> {
    self.properties.iter().find(|p| p.name == name)
  }
}

/// Registry of the types generated for one API version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedNamespace {
  pub tag: String,
  pub api_version: String,
  pub mode: GenerationMode,
  /// Keyed by class name, in generation order.
  pub collections: IndexMap<String, CollectionMeta>,
}

impl GeneratedNamespace {
  pub fn new(tag: impl Into<String>, api_version: impl Into<String>, mode: GenerationMode) -> Self {
    Self {
      tag: tag.into(),
      api_version: api_version.into(),
      mode,
      collections: IndexMap::new(),
    }
  }

  pub fn contains_class(&self, class_name: &str) -> bool {
    self.collections.contains_key(class_name)
  }

  pub fn insert(&mut self, meta: CollectionMeta) {
    self.collections.insert(meta.class_name.clone(), meta);
  }

  pub fn collection(&self, name: &str) -> Option<&CollectionMeta> {
    self.collections.values().find(|meta| meta.name == name)
  }
}

/// A finalized schema: the registry it was compiled from, the rendered SDL
/// and the parsed document.
#[derive(Debug)]
pub struct GeneratedSchema {
  pub namespace: GeneratedNamespace,
  pub sdl: String,
  pub document: ServiceDocument,
}

impl GeneratedSchema {
  pub fn tag(&self) -> &str {
    &self.namespace.tag
  }

  pub fn api_version(&self) -> &str {
    &self.namespace.api_version
  }

  pub fn collection(&self, name: &str) -> Option<&CollectionMeta> {
    self.namespace.collection(name)
  }

  pub fn collection_names(&self) -> Vec<&str> {
    self.namespace.collections.values().map(|meta| meta.name.as_str()).collect()
  }

  /// Names of every type defined by the parsed document.
  pub fn type_names(&self) -> Vec<&str> {
    self
      .document
      .definitions
      .iter()
      .filter_map(|definition| match definition {
        TypeSystemDefinition::Type(ty) => Some(ty.node.name.node.as_str()),
        _ => None,
      })
      .collect()
  }
}
