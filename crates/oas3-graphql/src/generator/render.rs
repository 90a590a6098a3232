//! Compiles a [`GeneratedNamespace`] into GraphQL SDL through the slot
//! templates, then parses the result into a [`GeneratedSchema`].

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::generator::{
  error::SchemaGenerationError,
  naming::{collection_type_name, is_graphql_name},
  registry::{CollectionMeta, GeneratedNamespace, GeneratedSchema, GenerationMode},
  templates::{TemplateKind, TemplateProvider, render},
};

const INDENT: &str = "  ";
const LIST_ARGUMENTS: &str = "(limit: Int, offset: Int, filter: JSON, sort_by: [String])";
const QUERY_ARGUMENTS: &str = "(id: ID, limit: Int, offset: Int, filter: JSON, sort_by: [String])";
const RESOLVED_FIELD_TYPE: &str = "JSON";
const PAGINATION_META_TYPE: &str = "PaginationMeta";

#[derive(Debug)]
struct FieldDef<'a> {
  name: &'a str,
  arguments: &'static str,
  graphql_type: String,
  description: Option<&'a str>,
  resolver: Option<&'a str>,
}

impl FieldDef<'_> {
  fn render(&self) -> String {
    let mut out = String::new();
    if let Some(description) = self.description {
      out.push_str(&description_block(description, INDENT));
    }
    out.push_str(INDENT);
    out.push_str(self.name);
    out.push_str(self.arguments);
    out.push_str(": ");
    out.push_str(&self.graphql_type);
    if let Some(resolver) = self.resolver {
      out.push_str(&format!(" @resolver(name: {})", string_literal(resolver)));
    }
    out
  }
}

/// Renders and parses the whole namespace.
pub fn compile(
  namespace: GeneratedNamespace,
  templates: &dyn TemplateProvider,
) -> Result<GeneratedSchema, SchemaGenerationError> {
  let model_template = templates.template(TemplateKind::ModelType)?;
  let query_template = templates.template(TemplateKind::QueryType)?;
  let schema_template = templates.template(TemplateKind::Schema)?;

  let types = namespace
    .collections
    .values()
    .map(|meta| render_model_type(&namespace, meta, &model_template))
    .collect::<Result<Vec<_>, _>>()?
    .join("\n");
  let query_type = render_query_type(&namespace, &query_template)?;

  let sdl = render(
    TemplateKind::Schema,
    &schema_template,
    &[
      ("api_version", namespace.api_version.as_str()),
      ("graphql_namespace", namespace.tag.as_str()),
      ("types", types.as_str()),
      ("query_type", query_type.as_str()),
    ],
  )?;

  let document = async_graphql_parser::parse_schema(&sdl).map_err(|err| SchemaGenerationError::Materialize {
    namespace: namespace.tag.clone(),
    message: err.to_string(),
  })?;

  Ok(GeneratedSchema {
    namespace,
    sdl,
    document,
  })
}

fn render_model_type(
  namespace: &GeneratedNamespace,
  meta: &CollectionMeta,
  template: &str,
) -> Result<String, SchemaGenerationError> {
  let fields = model_fields(namespace, meta).iter().map(FieldDef::render).join("\n");
  let description = meta
    .description
    .as_deref()
    .map(|text| description_block(text, ""))
    .unwrap_or_default();
  let directives = if meta.is_associated { " @associated" } else { "" };
  let is_associated = meta.is_associated.to_string();
  let associations = meta.associations.join(", ");

  Ok(render(
    TemplateKind::ModelType,
    template,
    &[
      ("api_version", namespace.api_version.as_str()),
      ("graphql_namespace", namespace.tag.as_str()),
      ("collection", meta.name.as_str()),
      ("class_name", meta.class_name.as_str()),
      ("description", description.as_str()),
      ("directives", directives),
      ("fields", fields.as_str()),
      ("is_associated", is_associated.as_str()),
      ("associations", associations.as_str()),
    ],
  )?)
}

/// Properties first, then resolver-only fields, then association list fields.
/// A name is used once; overlay resolvers attach to whichever field carries it.
fn model_fields<'a>(namespace: &'a GeneratedNamespace, meta: &'a CollectionMeta) -> Vec<FieldDef<'a>> {
  let resolver_for = |name: &str| meta.field_resolvers.get(name).map(String::as_str);
  let mut used = BTreeSet::new();
  let mut fields = Vec::new();

  for property in &meta.properties {
    used.insert(property.name.as_str());
    fields.push(FieldDef {
      name: &property.name,
      arguments: "",
      graphql_type: property.graphql_type.to_string(),
      description: property.description.as_deref(),
      resolver: resolver_for(property.name.as_str()),
    });
  }

  let association_targets: Vec<(&str, &str)> = meta
    .associations
    .iter()
    .filter_map(|sub| namespace.collection(sub).map(|target| (sub.as_str(), target.class_name.as_str())))
    .collect();
  let is_association = |name: &str| association_targets.iter().any(|(sub, _)| *sub == name);

  for (field, resolver) in &meta.field_resolvers {
    if used.contains(field.as_str()) || is_association(field.as_str()) || !is_graphql_name(field) {
      continue;
    }
    used.insert(field.as_str());
    fields.push(FieldDef {
      name: field,
      arguments: "",
      graphql_type: RESOLVED_FIELD_TYPE.to_string(),
      description: None,
      resolver: Some(resolver.as_str()),
    });
  }

  for (sub, target_class) in association_targets {
    if !used.insert(sub) {
      continue;
    }
    fields.push(FieldDef {
      name: sub,
      arguments: LIST_ARGUMENTS,
      graphql_type: format!("[{target_class}!]"),
      description: None,
      resolver: resolver_for(sub),
    });
  }

  fields
}

fn render_query_type(namespace: &GeneratedNamespace, template: &str) -> Result<String, SchemaGenerationError> {
  let fields = namespace
    .collections
    .values()
    .map(|meta| {
      let graphql_type = match namespace.mode {
        GenerationMode::Legacy => format!("[{}!]", meta.class_name),
        GenerationMode::PaginationV2 => format!("{}!", collection_type_name(&meta.class_name)),
      };
      FieldDef {
        name: &meta.name,
        arguments: QUERY_ARGUMENTS,
        graphql_type,
        description: None,
        resolver: None,
      }
      .render()
    })
    .join("\n");

  let collection_types = match namespace.mode {
    GenerationMode::Legacy => String::new(),
    GenerationMode::PaginationV2 => pagination_v2_types(namespace),
  };

  Ok(render(
    TemplateKind::QueryType,
    template,
    &[
      ("api_version", namespace.api_version.as_str()),
      ("graphql_namespace", namespace.tag.as_str()),
      ("collection_types", collection_types.as_str()),
      ("fields", fields.as_str()),
    ],
  )?)
}

fn pagination_v2_types(namespace: &GeneratedNamespace) -> String {
  let mut out = format!(
    "type {PAGINATION_META_TYPE} {{\n{INDENT}count: BigInt\n{INDENT}limit: Int\n{INDENT}offset: Int\n}}\n\n"
  );
  for meta in namespace.collections.values() {
    out.push_str(&format!(
      "type {} {{\n{INDENT}meta: {PAGINATION_META_TYPE}!\n{INDENT}data: [{}!]!\n}}\n\n",
      collection_type_name(&meta.class_name),
      meta.class_name
    ));
  }
  out
}

/// GraphQL block string description, indented.
fn description_block(text: &str, indent: &str) -> String {
  let escaped = text.trim().replace("\"\"\"", "\\\"\"\"");
  // A trailing quote or backslash would run into the closing delimiter.
  if escaped.contains('\n') || escaped.ends_with(['"', '\\']) {
    let body = escaped.lines().map(|line| format!("{indent}{line}")).join("\n");
    format!("{indent}\"\"\"\n{body}\n{indent}\"\"\"\n")
  } else {
    format!("{indent}\"\"\"{escaped}\"\"\"\n")
  }
}

fn string_literal(value: &str) -> String {
  let escaped = value
    .replace('\\', "\\\\")
    .replace('"', "\\\"")
    .replace('\n', "\\n");
  format!("\"{escaped}\"")
}
