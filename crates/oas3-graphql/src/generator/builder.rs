use std::{sync::Arc, time::Instant};

use tracing::info;

use crate::generator::{
  cache::SchemaCache,
  collections::collect_collections,
  error::SchemaGenerationError,
  naming::namespace_tag,
  overlay::Overlay,
  providers::{DocumentProvider, ModelIntrospector, NoEncryptedColumns, PathVersionResolver, VersionResolver},
  registry::{GeneratedNamespace, GeneratedSchema, GenerationMode},
  render::compile,
  templates::{TemplateDirectory, TemplateProvider},
};

/// Builds, once per API version, the GraphQL schema derived from that
/// version's OpenAPI document.
///
/// The first build of a version is stored in the [`SchemaCache`]; later calls
/// for the same version return the stored schema regardless of the mode or
/// overlay they pass.
#[derive(Clone)]
pub struct SchemaBuilder {
  documents: Arc<dyn DocumentProvider>,
  models: Arc<dyn ModelIntrospector>,
  templates: Arc<dyn TemplateProvider>,
  versions: Arc<dyn VersionResolver>,
  cache: Arc<SchemaCache>,
}

impl std::fmt::Debug for SchemaBuilder {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SchemaBuilder")
      .field("cache", &self.cache.namespaces())
      .finish_non_exhaustive()
  }
}

impl SchemaBuilder {
  pub fn new(documents: Arc<dyn DocumentProvider>) -> Self {
    Self {
      documents,
      models: Arc::new(NoEncryptedColumns),
      templates: Arc::new(TemplateDirectory::default()),
      versions: Arc::new(PathVersionResolver),
      cache: SchemaCache::global(),
    }
  }

  #[must_use]
  pub fn with_models(mut self, models: Arc<dyn ModelIntrospector>) -> Self {
    self.models = models;
    self
  }

  #[must_use]
  pub fn with_templates(mut self, templates: Arc<dyn TemplateProvider>) -> Self {
    self.templates = templates;
    self
  }

  #[must_use]
  pub fn with_versions(mut self, versions: Arc<dyn VersionResolver>) -> Self {
    self.versions = versions;
    self
  }

  #[must_use]
  pub fn with_cache(mut self, cache: Arc<SchemaCache>) -> Self {
    self.cache = cache;
    self
  }

  pub fn cache(&self) -> &Arc<SchemaCache> {
    &self.cache
  }

  /// Schema for the API version addressed by `request`.
  pub fn build(
    &self,
    request: &http::request::Parts,
    mode: GenerationMode,
    overlay: &Overlay,
  ) -> Result<Arc<GeneratedSchema>, SchemaGenerationError> {
    let version = self
      .versions
      .version(request)
      .ok_or_else(|| SchemaGenerationError::UnknownApiVersion {
        path: request.uri.path().to_string(),
      })?;
    self.build_for_version(&version, mode, overlay)
  }

  pub fn build_for_version(
    &self,
    version: &str,
    mode: GenerationMode,
    overlay: &Overlay,
  ) -> Result<Arc<GeneratedSchema>, SchemaGenerationError> {
    let tag = namespace_tag(version);
    self
      .cache
      .get_or_try_build(&tag, || self.generate(version, &tag, mode, overlay))
  }

  fn generate(
    &self,
    version: &str,
    tag: &str,
    mode: GenerationMode,
    overlay: &Overlay,
  ) -> Result<GeneratedSchema, SchemaGenerationError> {
    let started = Instant::now();
    info!(%version, namespace = %tag, %mode, "building GraphQL schema");

    let spec = self
      .documents
      .document(version)
      .map_err(|source| SchemaGenerationError::Document {
        version: version.to_string(),
        source,
      })?;

    let mut namespace = GeneratedNamespace::new(tag, version, mode);
    collect_collections(&spec, self.models.as_ref(), overlay, &mut namespace)?;
    let collections = namespace.collections.len();
    let schema = compile(namespace, self.templates.as_ref())?;

    info!(
      namespace = %tag,
      collections,
      elapsed_ms = started.elapsed().as_millis() as u64,
      "GraphQL schema built"
    );
    Ok(schema)
  }
}
