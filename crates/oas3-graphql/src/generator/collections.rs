use std::collections::BTreeSet;

use oas3::{
  Spec,
  spec::{ObjectOrReference, ObjectSchema, SchemaType, SchemaTypeSet},
};
use serde_json::Value;
use tracing::debug;

use crate::generator::{
  associations::resource_associations,
  error::SchemaGenerationError,
  naming::{class_name, collection_from_path, is_graphql_name},
  overlay::{DESCRIPTION_KEY, EXCLUDE_PROPERTIES_KEY, Overlay},
  providers::ModelIntrospector,
  registry::{CollectionMeta, GeneratedNamespace, PropertyMeta},
  type_mapper::{graphql_type, property_type},
};

/// Suffix of the response schema tried when no schema is named after the class.
const OUTPUT_SCHEMA_SUFFIX: &str = "Out";

/// Walks the path table of `spec` and records one [`CollectionMeta`] per
/// queryable collection in `namespace`.
///
/// Paths are visited in lexicographic order. A collection qualifies when it has
/// a `GET /<collection>/{..._id}` path and an object schema with properties
/// named after its class (or `<Class>Out`). A class already present in the
/// namespace is not analysed again.
pub fn collect_collections(
  spec: &Spec,
  models: &dyn ModelIntrospector,
  overlay: &Overlay,
  namespace: &mut GeneratedNamespace,
) -> Result<(), SchemaGenerationError> {
  let Some(paths) = spec.paths.as_ref() else {
    return Ok(());
  };

  for (path, item) in paths {
    if item.get.is_none() {
      continue;
    }
    let Some(collection) = collection_from_path(path) else {
      continue;
    };
    if !is_graphql_name(collection) {
      debug!(%path, %collection, "collection is not a valid GraphQL name; skipping");
      continue;
    }
    let class_name = class_name(collection);
    if namespace.contains_class(&class_name) {
      continue;
    }

    let Some((schema_name, schema)) = openapi_schema(spec, &class_name) else {
      debug!(%path, %class_name, "no component schema; skipping collection");
      continue;
    };
    if schema.schema_type != Some(SchemaTypeSet::Single(SchemaType::Object)) || schema.properties.is_empty() {
      debug!(%path, %schema_name, "schema is not an object with properties; skipping collection");
      continue;
    }

    let meta = analyze_collection(spec, models, overlay, collection, &class_name, &schema_name, &schema)?;
    if meta.properties.is_empty() && meta.field_resolvers.is_empty() {
      debug!(%path, %class_name, "no representable fields; skipping collection");
      continue;
    }

    let associations = resource_associations(paths, collection);
    namespace.insert(CollectionMeta {
      is_associated: associations.is_associated,
      associations: associations.associations.into_iter().collect(),
      ..meta
    });
  }

  Ok(())
}

/// Component schema for `class_name`, trying the bare name before `<Name>Out`.
pub(crate) fn openapi_schema(spec: &Spec, class_name: &str) -> Option<(String, ObjectSchema)> {
  let schemas = &spec.components.as_ref()?.schemas;
  [class_name.to_string(), format!("{class_name}{OUTPUT_SCHEMA_SUFFIX}")]
    .into_iter()
    .find_map(|name| {
      let schema = schemas.get(&name)?.resolve(spec).ok()?;
      Some((name, schema))
    })
}

fn analyze_collection(
  spec: &Spec,
  models: &dyn ModelIntrospector,
  overlay: &Overlay,
  collection: &str,
  class_name: &str,
  schema_name: &str,
  schema: &ObjectSchema,
) -> Result<CollectionMeta, SchemaGenerationError> {
  let encrypted = models
    .encrypted_columns(class_name)
    .map_err(|source| SchemaGenerationError::Introspection {
      class_name: class_name.to_string(),
      source,
    })?;

  // Patterns may name the collection (`sources`) or its class (`Source`).
  let overlay_names = [collection, class_name];
  let overrides = overlay.schema_overlay_for(&overlay_names);
  let excluded: BTreeSet<&str> = overrides
    .get(EXCLUDE_PROPERTIES_KEY)
    .and_then(Value::as_array)
    .map(|names| names.iter().filter_map(Value::as_str).collect())
    .unwrap_or_default();

  let mut properties = Vec::with_capacity(schema.properties.len());
  for (name, property) in &schema.properties {
    if encrypted.contains(name) || excluded.contains(name.as_str()) {
      continue;
    }
    if !is_graphql_name(name) {
      debug!(%schema_name, property = %name, "property is not a valid GraphQL name; dropped");
      continue;
    }

    let property = resolve_property(spec, schema_name, name, property)?;
    let format = property.format.as_deref().unwrap_or_default();
    match graphql_type(name, format, property_type(&property)) {
      Some(graphql_type) => properties.push(PropertyMeta {
        name: name.clone(),
        graphql_type,
        description: property.description.clone(),
      }),
      None => debug!(%schema_name, property = %name, "property has no scalar mapping; dropped"),
    }
  }

  let description = overrides
    .get(DESCRIPTION_KEY)
    .and_then(Value::as_str)
    .map(ToString::to_string)
    .or_else(|| schema.description.clone());

  Ok(CollectionMeta {
    name: collection.to_string(),
    class_name: class_name.to_string(),
    description,
    properties,
    field_resolvers: overlay.field_resolvers_for(&overlay_names),
    is_associated: false,
    associations: Vec::new(),
  })
}

fn resolve_property(
  spec: &Spec,
  schema_name: &str,
  property_name: &str,
  property: &ObjectOrReference<ObjectSchema>,
) -> Result<ObjectSchema, SchemaGenerationError> {
  match property {
    ObjectOrReference::Object(schema) => Ok(schema.clone()),
    ObjectOrReference::Ref { ref_path, .. } => {
      property
        .resolve(spec)
        .map_err(|_| SchemaGenerationError::UnresolvedReference {
          schema: schema_name.to_string(),
          property: property_name.to_string(),
          reference: ref_path.clone(),
        })
    }
  }
}
