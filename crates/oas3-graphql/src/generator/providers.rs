//! Seams to the collaborators a schema build depends on: the OpenAPI document
//! store, the API version of a request and the model layer.

use std::{
  collections::{BTreeMap, BTreeSet, HashMap},
  path::{Path, PathBuf},
  sync::{Arc, LazyLock, Mutex, PoisonError},
};

use regex::Regex;

use crate::{
  generator::error::{DocumentError, IntrospectionError},
  utils::spec::SpecFormat,
};

/// Hands out the OpenAPI document of an API version.
pub trait DocumentProvider: Send + Sync {
  fn document(&self, version: &str) -> Result<Arc<oas3::Spec>, DocumentError>;
}

/// Resolves the API version addressed by a request.
pub trait VersionResolver: Send + Sync {
  fn version(&self, request: &http::request::Parts) -> Option<String>;
}

/// Reports which columns of a model are stored encrypted and must never be exposed.
pub trait ModelIntrospector: Send + Sync {
  fn encrypted_columns(&self, class_name: &str) -> Result<BTreeSet<String>, IntrospectionError>;
}

/// Documents registered up front, keyed by version.
#[derive(Debug, Default, Clone)]
pub struct StaticDocuments {
  documents: BTreeMap<String, Arc<oas3::Spec>>,
}

impl StaticDocuments {
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn with_document(mut self, version: impl Into<String>, spec: oas3::Spec) -> Self {
    self.documents.insert(version.into(), Arc::new(spec));
    self
  }
}

impl DocumentProvider for StaticDocuments {
  fn document(&self, version: &str) -> Result<Arc<oas3::Spec>, DocumentError> {
    self
      .documents
      .get(version)
      .cloned()
      .ok_or_else(|| DocumentError::NotFound {
        version: version.to_string(),
      })
  }
}

/// Loads `<root>/v<version>/openapi.json` (or `.yaml`/`.yml`) on first use and
/// keeps the parsed document for the life of the provider.
#[derive(Debug)]
pub struct SpecDirectory {
  root: PathBuf,
  loaded: Mutex<HashMap<String, Arc<oas3::Spec>>>,
}

impl SpecDirectory {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      loaded: Mutex::new(HashMap::new()),
    }
  }

  fn locate(&self, version: &str) -> Option<PathBuf> {
    let dir = self.root.join(format!("v{version}"));
    ["openapi.json", "openapi.yaml", "openapi.yml"]
      .into_iter()
      .map(|file| dir.join(file))
      .find(|path| path.is_file())
  }

  fn load(path: &Path) -> Result<oas3::Spec, DocumentError> {
    let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    let format = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map_or(SpecFormat::default(), SpecFormat::from_extension);
    format.parse_str(&content).map_err(|err| DocumentError::Parse {
      path: path.to_path_buf(),
      message: err.to_string(),
    })
  }
}

impl DocumentProvider for SpecDirectory {
  fn document(&self, version: &str) -> Result<Arc<oas3::Spec>, DocumentError> {
    let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(spec) = loaded.get(version) {
      return Ok(Arc::clone(spec));
    }

    let path = self.locate(version).ok_or_else(|| DocumentError::NotFound {
      version: version.to_string(),
    })?;
    let spec = Arc::new(Self::load(&path)?);
    loaded.insert(version.to_string(), Arc::clone(&spec));
    Ok(spec)
  }
}

static VERSION_SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^v(\d+\.\d+)$").unwrap());

/// Takes the version from the first `v<major>.<minor>` path segment,
/// e.g. `/api/sources/v3.1/graphql` resolves to `3.1`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathVersionResolver;

impl VersionResolver for PathVersionResolver {
  fn version(&self, request: &http::request::Parts) -> Option<String> {
    request
      .uri
      .path()
      .split('/')
      .find_map(|segment| VERSION_SEGMENT_RE.captures(segment))
      .and_then(|caps| caps.get(1))
      .map(|m| m.as_str().to_string())
  }
}

/// Model layer without encrypted columns.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEncryptedColumns;

impl ModelIntrospector for NoEncryptedColumns {
  fn encrypted_columns(&self, _class_name: &str) -> Result<BTreeSet<String>, IntrospectionError> {
    Ok(BTreeSet::new())
  }
}

/// Encrypted columns per model class. Models that are not listed have none.
#[derive(Debug, Default, Clone)]
pub struct EncryptedColumns {
  columns: BTreeMap<String, BTreeSet<String>>,
}

impl EncryptedColumns {
  pub fn new(columns: BTreeMap<String, BTreeSet<String>>) -> Self {
    Self { columns }
  }
}

impl ModelIntrospector for EncryptedColumns {
  fn encrypted_columns(&self, class_name: &str) -> Result<BTreeSet<String>, IntrospectionError> {
    Ok(self.columns.get(class_name).cloned().unwrap_or_default())
  }
}
