use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Overlay key holding the field resolver table.
pub const FIELD_RESOLVERS_KEY: &str = "field_resolvers";
/// Schema override replacing the generated type description.
pub const DESCRIPTION_KEY: &str = "description";
/// Schema override listing properties to leave out of the generated type.
pub const EXCLUDE_PROPERTIES_KEY: &str = "exclude_properties";

#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
  #[error("invalid overlay pattern '{pattern}': {source}")]
  InvalidPattern {
    pattern: String,
    #[source]
    source: regex::Error,
  },
}

/// Customizations applied to every collection whose name matches the entry's pattern.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OverlayEntry {
  /// Field name to resolver reference.
  #[serde(default)]
  pub field_resolvers: IndexMap<String, String>,
  /// Remaining keys, kept verbatim as schema overrides.
  #[serde(flatten)]
  pub overrides: Map<String, Value>,
}

impl OverlayEntry {
  /// The entry as a flat mapping, `field_resolvers` included.
  fn to_map(&self) -> Map<String, Value> {
    let mut map = Map::new();
    if !self.field_resolvers.is_empty() {
      let resolvers = self
        .field_resolvers
        .iter()
        .map(|(field, resolver)| (field.clone(), Value::String(resolver.clone())))
        .collect();
      map.insert(FIELD_RESOLVERS_KEY.to_string(), Value::Object(resolvers));
    }
    for (key, value) in &self.overrides {
      map.insert(key.clone(), value.clone());
    }
    map
  }
}

/// Caller-supplied, ordered mapping of collection-name pattern to customizations.
///
/// Patterns are unanchored regular expressions, compiled once on construction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "IndexMap<String, OverlayEntry>")]
pub struct Overlay {
  entries: Vec<(Regex, OverlayEntry)>,
}

impl Overlay {
  pub fn new(entries: IndexMap<String, OverlayEntry>) -> Result<Self, OverlayError> {
    let entries = entries
      .into_iter()
      .map(|(pattern, entry)| {
        Regex::new(&pattern)
          .map(|re| (re, entry))
          .map_err(|source| OverlayError::InvalidPattern { pattern, source })
      })
      .collect::<Result<_, _>>()?;
    Ok(Self { entries })
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  fn matching<'a>(&'a self, names: &'a [&'a str]) -> impl Iterator<Item = &'a OverlayEntry> + 'a {
    self
      .entries
      .iter()
      .filter(move |(re, _)| names.iter().any(|name| re.is_match(name)))
      .map(|(_, entry)| entry)
  }

  /// Field resolvers of every entry matching any of `names`, merged in
  /// declaration order. Later entries win on conflicts.
  pub fn field_resolvers_for(&self, names: &[&str]) -> IndexMap<String, String> {
    let mut resolvers = IndexMap::new();
    for entry in self.matching(names) {
      resolvers.extend(entry.field_resolvers.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    resolvers
  }

  /// Whole entries matching any of `names`, merged with the same precedence as
  /// [`Overlay::field_resolvers_for`]. Values are replaced, not deep-merged.
  pub fn schema_overlay_for(&self, names: &[&str]) -> Map<String, Value> {
    let mut merged = Map::new();
    for entry in self.matching(names) {
      merged.extend(entry.to_map());
    }
    merged
  }
}

impl TryFrom<IndexMap<String, OverlayEntry>> for Overlay {
  type Error = OverlayError;

  fn try_from(entries: IndexMap<String, OverlayEntry>) -> Result<Self, Self::Error> {
    Self::new(entries)
  }
}

/// Merges the field resolvers of every entry matching `collection`.
///
/// Entries are visited in declaration order; later entries win on conflicts.
pub fn collection_field_resolvers(overlay: &Overlay, collection: &str) -> IndexMap<String, String> {
  overlay.field_resolvers_for(&[collection])
}

/// Merges whole entries matching `collection`, with the same precedence as
/// [`collection_field_resolvers`].
pub fn collection_schema_overlay(overlay: &Overlay, collection: &str) -> Map<String, Value> {
  overlay.schema_overlay_for(&[collection])
}
