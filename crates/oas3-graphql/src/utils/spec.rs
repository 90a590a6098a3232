use std::{ffi::OsStr, path::Path};

use fmmap::tokio::{AsyncMmapFile, AsyncMmapFileExt};
use oas3::OpenApiV3Spec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecFormat {
  #[default]
  Json,
  Yaml,
}

impl SpecFormat {
  #[must_use]
  pub fn from_extension(ext: &str) -> Self {
    match ext {
      "yaml" | "yml" => Self::Yaml,
      _ => Self::Json,
    }
  }

  pub fn parse_str(self, content: &str) -> anyhow::Result<oas3::Spec> {
    match self {
      Self::Json => Ok(serde_json::from_str::<OpenApiV3Spec>(content)?),
      Self::Yaml => Ok(oas3::from_yaml(content)?),
    }
  }
}

/// Memory-maps a spec file for the CLI.
pub struct SpecLoader {
  file: AsyncMmapFile,
  format: SpecFormat,
}

impl SpecLoader {
  pub async fn open(path: &Path) -> anyhow::Result<Self> {
    let format = path
      .extension()
      .and_then(OsStr::to_str)
      .map_or(SpecFormat::default(), SpecFormat::from_extension);

    let file = AsyncMmapFile::open(path).await?;

    Ok(Self { file, format })
  }

  pub fn parse(&self) -> anyhow::Result<oas3::Spec> {
    let content = std::str::from_utf8(self.file.as_slice())?;
    self.format.parse_str(content)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_format_from_extension() {
    assert_eq!(SpecFormat::from_extension("yml"), SpecFormat::Yaml);
    assert_eq!(SpecFormat::from_extension("yaml"), SpecFormat::Yaml);
    assert_eq!(SpecFormat::from_extension("json"), SpecFormat::Json);
    assert_eq!(SpecFormat::from_extension("txt"), SpecFormat::Json);
  }

  #[test]
  fn test_parse_yaml() {
    let yaml = "openapi: 3.1.0\ninfo:\n  title: Tiny\n  version: 1.0.0\npaths: {}\n";
    let spec = SpecFormat::Yaml.parse_str(yaml).unwrap();
    assert_eq!(spec.info.title, "Tiny");
  }

  #[tokio::test]
  async fn test_loader_reads_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("openapi.json");
    std::fs::write(&path, include_str!("../../fixtures/sources_api.json")).unwrap();

    let spec = SpecLoader::open(&path).await.unwrap().parse().unwrap();
    assert_eq!(spec.info.version, "3.1.0");
  }
}
