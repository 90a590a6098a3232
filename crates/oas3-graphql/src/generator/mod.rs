pub mod associations;
pub mod builder;
pub mod cache;
pub(crate) mod collections;
pub mod error;
pub mod naming;
pub mod overlay;
pub mod providers;
pub mod registry;
pub(crate) mod render;
pub mod templates;
pub mod type_mapper;

pub use builder::SchemaBuilder;
pub use cache::SchemaCache;
pub use error::{DocumentError, IntrospectionError, SchemaGenerationError, TemplateError};
pub use overlay::{Overlay, OverlayEntry, OverlayError};
pub use providers::{
  DocumentProvider, EncryptedColumns, ModelIntrospector, NoEncryptedColumns, PathVersionResolver, SpecDirectory,
  StaticDocuments, VersionResolver,
};
pub use registry::{CollectionMeta, GeneratedNamespace, GeneratedSchema, GenerationMode, PropertyMeta};
pub use templates::{TemplateDirectory, TemplateKind, TemplateProvider};
pub use type_mapper::{BigInt, ScalarTag, graphql_type};

#[cfg(test)]
mod tests;
