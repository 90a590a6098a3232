#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
//! Derives a GraphQL schema from the collections of an OpenAPI document.
//!
//! A [`SchemaBuilder`] walks the path table of one API version, maps the
//! response schema of every `GET /<collection>/{id}` resource to an object
//! type, links sub-collections and renders the result as SDL. The schema of
//! each version is built once and shared through a [`SchemaCache`].

pub mod generator;
pub mod utils;

pub use generator::{
  GeneratedSchema, GenerationMode, Overlay, SchemaBuilder, SchemaCache, SchemaGenerationError,
  associations::{ResourceAssociations, resource_associations},
  overlay::{collection_field_resolvers, collection_schema_overlay},
};
