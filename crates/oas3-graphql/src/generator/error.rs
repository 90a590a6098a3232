use std::path::PathBuf;

/// Failure loading the OpenAPI document of an API version.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
  #[error("no OpenAPI document registered for version {version}")]
  NotFound { version: String },

  #[error("failed to read {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse {}: {message}", path.display())]
  Parse { path: PathBuf, message: String },
}

/// Failure asking the model layer for its encrypted columns.
#[derive(Debug, thiserror::Error)]
pub enum IntrospectionError {
  #[error("unknown model {0}")]
  UnknownModel(String),

  #[error("{0}")]
  Other(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
  #[error("failed to read template {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("template {template} references unknown slot '{slot}'")]
  UnknownSlot { template: String, slot: String },
}

/// Aborts the schema build of one API version. Nothing is cached; the next
/// caller builds again.
#[derive(Debug, thiserror::Error)]
pub enum SchemaGenerationError {
  #[error("unable to determine the API version from request path '{path}'")]
  UnknownApiVersion { path: String },

  #[error("OpenAPI document for version {version} is unavailable: {source}")]
  Document {
    version: String,
    #[source]
    source: DocumentError,
  },

  #[error("encrypted column lookup failed for {class_name}: {source}")]
  Introspection {
    class_name: String,
    #[source]
    source: IntrospectionError,
  },

  #[error("property {schema}.{property} references unresolvable '{reference}'")]
  UnresolvedReference {
    schema: String,
    property: String,
    reference: String,
  },

  #[error(transparent)]
  Template(#[from] TemplateError),

  #[error("generated schema for namespace {namespace} is invalid: {message}")]
  Materialize { namespace: String, message: String },
}
