use std::{
  collections::{BTreeMap, BTreeSet},
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context;
use oas3_graphql::{
  GenerationMode, Overlay, SchemaBuilder, SchemaCache,
  generator::{EncryptedColumns, StaticDocuments, TemplateDirectory},
  utils::spec::SpecLoader,
};
use tracing::info;

use crate::ui::GenerateCommand;

#[derive(Debug, Clone)]
pub struct GenerateConfig {
  pub input: PathBuf,
  pub output: Option<PathBuf>,
  pub api_version: Option<String>,
  pub mode: GenerationMode,
  pub overlay: Option<PathBuf>,
  pub templates: Option<PathBuf>,
  pub encrypted_columns: BTreeMap<String, BTreeSet<String>>,
}

impl GenerateConfig {
  pub fn from_command(command: GenerateCommand) -> anyhow::Result<Self> {
    let GenerateCommand {
      input,
      output,
      api_version,
      pagination,
      overlay,
      templates,
      encrypted_columns,
    } = command;

    if let Some(dir) = &templates
      && !dir.is_dir()
    {
      anyhow::bail!("Template directory '{}' does not exist", dir.display());
    }

    Ok(Self {
      input,
      output,
      api_version,
      mode: pagination.into(),
      overlay,
      templates,
      encrypted_columns: parse_encrypted_columns(encrypted_columns)?,
    })
  }

  async fn load_spec(&self) -> anyhow::Result<oas3::Spec> {
    SpecLoader::open(&self.input).await?.parse()
  }

  async fn load_overlay(&self) -> anyhow::Result<Overlay> {
    match &self.overlay {
      Some(path) => read_overlay(path).await,
      None => Ok(Overlay::default()),
    }
  }

  async fn write_output(&self, sdl: &str) -> anyhow::Result<()> {
    let Some(output) = &self.output else {
      println!("{sdl}");
      return Ok(());
    };
    if let Some(parent) = output.parent()
      && !parent.as_os_str().is_empty()
    {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output, sdl).await?;
    Ok(())
  }
}

pub async fn generate_schema(config: GenerateConfig) -> anyhow::Result<()> {
  let spec = config.load_spec().await?;
  let overlay = config.load_overlay().await?;
  let version = config
    .api_version
    .clone()
    .unwrap_or_else(|| default_api_version(&spec.info.version));

  let documents = StaticDocuments::new().with_document(version.clone(), spec);
  let builder = SchemaBuilder::new(Arc::new(documents))
    .with_models(Arc::new(EncryptedColumns::new(config.encrypted_columns.clone())))
    .with_templates(Arc::new(TemplateDirectory::new(config.templates.clone())))
    .with_cache(Arc::new(SchemaCache::new()));

  let schema = builder.build_for_version(&version, config.mode, &overlay)?;
  config.write_output(&schema.sdl).await?;

  if let Some(output) = &config.output {
    info!(
      path = %output.display(),
      namespace = %schema.tag(),
      collections = schema.namespace.collections.len(),
      "wrote GraphQL schema"
    );
  }
  Ok(())
}

/// `MAJOR.MINOR` of the document's `info.version`.
pub(crate) fn default_api_version(info_version: &str) -> String {
  let mut parts = info_version.trim_start_matches('v').split('.');
  match (parts.next(), parts.next()) {
    (Some(major), Some(minor)) => format!("{major}.{minor}"),
    (Some(major), None) => format!("{major}.0"),
    _ => info_version.to_string(),
  }
}

async fn read_overlay(path: &Path) -> anyhow::Result<Overlay> {
  let content = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("Failed to read overlay '{}'", path.display()))?;
  parse_overlay(&content).with_context(|| format!("Invalid overlay '{}'", path.display()))
}

fn parse_overlay(content: &str) -> anyhow::Result<Overlay> {
  let mut de = serde_json::Deserializer::from_str(content);
  serde_path_to_error::deserialize(&mut de).map_err(|err| {
    let path = err.path().to_string();
    anyhow::anyhow!("at '{path}': {}", err.into_inner())
  })
}

fn parse_encrypted_columns(entries: Option<Vec<String>>) -> anyhow::Result<BTreeMap<String, BTreeSet<String>>> {
  let Some(entries) = entries else {
    return Ok(BTreeMap::new());
  };

  let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
  for entry in entries {
    let (class_name, columns) = entry
      .split_once('=')
      .filter(|(class_name, _)| !class_name.is_empty())
      .ok_or_else(|| {
        anyhow::anyhow!("Invalid encrypted columns format '{entry}': expected CLASS=COLUMNS (e.g., Endpoint=password)")
      })?;
    map.entry(class_name.to_string()).or_default().extend(
      columns
        .split(',')
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .map(ToString::to_string),
    );
  }
  Ok(map)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_api_version() {
    assert_eq!(default_api_version("3.1.0"), "3.1");
    assert_eq!(default_api_version("v1.0"), "1.0");
    assert_eq!(default_api_version("2"), "2.0");
  }

  #[test]
  fn test_parse_encrypted_columns() {
    let map = parse_encrypted_columns(Some(vec![
      "Endpoint=password, token".to_string(),
      "Authentication=password".to_string(),
      "Endpoint=certificate".to_string(),
    ]))
    .unwrap();

    assert_eq!(
      map["Endpoint"],
      BTreeSet::from(["certificate".to_string(), "password".to_string(), "token".to_string()])
    );
    assert_eq!(map["Authentication"], BTreeSet::from(["password".to_string()]));
    assert!(parse_encrypted_columns(None).unwrap().is_empty());
    assert!(parse_encrypted_columns(Some(vec!["password".to_string()])).is_err());
    assert!(parse_encrypted_columns(Some(vec!["=password".to_string()])).is_err());
  }

  #[test]
  fn test_parse_overlay_reports_path() {
    let overlay = parse_overlay(r#"{ "sources": { "field_resolvers": { "name": "SourceName" } } }"#).unwrap();
    assert_eq!(overlay.len(), 1);

    let err = parse_overlay(r#"{ "sources": { "field_resolvers": { "name": 42 } } }"#).unwrap_err();
    assert!(err.to_string().contains("at 'sources"), "{err}");

    assert!(parse_overlay(r#"{ "(": {} }"#).is_err());
  }

  #[tokio::test]
  async fn test_generate_writes_schema() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("openapi.json");
    let output = dir.path().join("out/schema.graphql");
    std::fs::write(&input, include_str!("../../../fixtures/sources_api.json")).unwrap();

    let config = GenerateConfig {
      input,
      output: Some(output.clone()),
      api_version: None,
      mode: GenerationMode::PaginationV2,
      overlay: None,
      templates: None,
      encrypted_columns: BTreeMap::from([("Endpoint".to_string(), BTreeSet::from(["password".to_string()]))]),
    };
    generate_schema(config).await.unwrap();

    let sdl = std::fs::read_to_string(output).unwrap();
    assert!(sdl.contains("API version 3.1 (namespace V3x1)"));
    assert!(sdl.contains("type EndpointCollection {"));
    assert!(!sdl.contains("password"));
  }
}
