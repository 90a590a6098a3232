use std::{path::Path, sync::Arc};

use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};
use oas3_graphql::{
  GenerationMode, Overlay, SchemaBuilder, SchemaCache,
  generator::{CollectionMeta, StaticDocuments},
  utils::spec::SpecLoader,
};

use super::generate::default_api_version;

pub async fn list_collections(input: &Path) -> anyhow::Result<()> {
  let spec = SpecLoader::open(input).await?.parse()?;
  let version = default_api_version(&spec.info.version);

  let documents = StaticDocuments::new().with_document(version.clone(), spec);
  let schema = SchemaBuilder::new(Arc::new(documents))
    .with_cache(Arc::new(SchemaCache::new()))
    .build_for_version(&version, GenerationMode::Legacy, &Overlay::default())?;

  println!("{}", collections_table(schema.namespace.collections.values()));
  Ok(())
}

fn collections_table<'a>(collections: impl Iterator<Item = &'a CollectionMeta>) -> Table {
  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic);

  let mut header = Row::new();
  for label in ["COLLECTION", "TYPE", "FIELDS", "ASSOCIATED", "ASSOCIATIONS"] {
    header.add_cell(Cell::new(label).add_attribute(Attribute::Bold));
  }
  table.set_header(header);

  for meta in collections {
    let mut row = Row::new();
    row.add_cell(Cell::new(&meta.name).add_attribute(Attribute::Bold));
    row.add_cell(Cell::new(&meta.class_name));
    row.add_cell(Cell::new(meta.properties.len()).set_alignment(CellAlignment::Right));
    row.add_cell(Cell::new(if meta.is_associated { "yes" } else { "no" }));
    row.add_cell(Cell::new(meta.associations.join(", ")));
    table.add_row(row);
  }

  table
}
