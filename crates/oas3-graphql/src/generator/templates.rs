use std::{borrow::Cow, path::PathBuf, sync::LazyLock};

use regex::{Captures, Regex};
use strum::{AsRefStr, Display, EnumIter};

use crate::generator::error::TemplateError;

const DEFAULT_MODEL_TYPE: &str = include_str!("../../templates/model_type.graphql");
const DEFAULT_QUERY_TYPE: &str = include_str!("../../templates/query_type.graphql");
const DEFAULT_SCHEMA: &str = include_str!("../../templates/schema.graphql");

const TEMPLATE_EXTENSION: &str = "graphql";

static SLOT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum TemplateKind {
  ModelType,
  QueryType,
  Schema,
}

impl TemplateKind {
  pub fn default_template(self) -> &'static str {
    match self {
      Self::ModelType => DEFAULT_MODEL_TYPE,
      Self::QueryType => DEFAULT_QUERY_TYPE,
      Self::Schema => DEFAULT_SCHEMA,
    }
  }

  pub fn file_name(self) -> String {
    format!("{}.{TEMPLATE_EXTENSION}", self.as_ref())
  }
}

pub trait TemplateProvider: Send + Sync {
  fn template(&self, kind: TemplateKind) -> Result<Cow<'static, str>, TemplateError>;
}

/// Looks for `<kind>.graphql` in an application override directory first and
/// falls back to the built-in template.
#[derive(Debug, Clone, Default)]
pub struct TemplateDirectory {
  override_dir: Option<PathBuf>,
}

impl TemplateDirectory {
  pub fn new(override_dir: Option<PathBuf>) -> Self {
    Self { override_dir }
  }

  pub fn template_path(&self, kind: TemplateKind) -> Option<PathBuf> {
    self
      .override_dir
      .as_ref()
      .map(|dir| dir.join(kind.file_name()))
      .filter(|path| path.is_file())
  }
}

impl TemplateProvider for TemplateDirectory {
  fn template(&self, kind: TemplateKind) -> Result<Cow<'static, str>, TemplateError> {
    match self.template_path(kind) {
      Some(path) => std::fs::read_to_string(&path)
        .map(Cow::Owned)
        .map_err(|source| TemplateError::Io { path, source }),
      None => Ok(Cow::Borrowed(kind.default_template())),
    }
  }
}

/// Fills every `{{slot}}` of `template` from `slots`.
///
/// Slots not referenced by the template are ignored; a referenced slot with no
/// value is an error.
pub fn render(kind: TemplateKind, template: &str, slots: &[(&str, &str)]) -> Result<String, TemplateError> {
  if let Some(missing) = SLOT_RE
    .captures_iter(template)
    .filter_map(|caps| caps.get(1))
    .find(|name| !slots.iter().any(|(slot, _)| *slot == name.as_str()))
  {
    return Err(TemplateError::UnknownSlot {
      template: kind.to_string(),
      slot: missing.as_str().to_string(),
    });
  }

  let rendered = SLOT_RE.replace_all(template, |caps: &Captures<'_>| {
    slots
      .iter()
      .find(|(slot, _)| *slot == &caps[1])
      .map(|(_, value)| (*value).to_string())
      .unwrap_or_default()
  });
  Ok(rendered.into_owned())
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn test_render_fills_slots() {
    let out = render(
      TemplateKind::ModelType,
      "type {{ class_name }} { {{fields}} }",
      &[("class_name", "Source"), ("fields", "id: ID!"), ("unused", "x")],
    )
    .unwrap();
    assert_eq!(out, "type Source { id: ID! }");
  }

  #[test]
  fn test_render_rejects_unknown_slot() {
    let err = render(TemplateKind::Schema, "{{types}} {{bogus}}", &[("types", "")]).unwrap_err();
    match err {
      TemplateError::UnknownSlot { template, slot } => {
        assert_eq!(template, "schema");
        assert_eq!(slot, "bogus");
      }
      TemplateError::Io { .. } => panic!("expected UnknownSlot"),
    }
  }

  #[test]
  fn test_defaults_are_used_without_override() {
    let templates = TemplateDirectory::default();
    for kind in TemplateKind::iter() {
      assert_eq!(templates.template(kind).unwrap(), kind.default_template());
    }
  }

  #[test]
  fn test_override_directory_takes_precedence() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("query_type.graphql"), "type Query { ok: Boolean }").unwrap();

    let templates = TemplateDirectory::new(Some(dir.path().to_path_buf()));
    assert_eq!(
      templates.template(TemplateKind::QueryType).unwrap(),
      "type Query { ok: Boolean }"
    );
    assert_eq!(
      templates.template(TemplateKind::Schema).unwrap(),
      TemplateKind::Schema.default_template()
    );
    assert!(templates.template_path(TemplateKind::ModelType).is_none());
  }

  #[test]
  fn test_file_names() {
    assert_eq!(TemplateKind::ModelType.file_name(), "model_type.graphql");
    assert_eq!(TemplateKind::QueryType.file_name(), "query_type.graphql");
    assert_eq!(TemplateKind::Schema.file_name(), "schema.graphql");
  }
}
