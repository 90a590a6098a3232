use std::sync::Arc;

use serde_json::Value;

use crate::generator::{
  builder::SchemaBuilder, cache::SchemaCache, overlay::Overlay, providers::StaticDocuments,
};

pub(super) const SOURCES_API: &str = include_str!("../../../fixtures/sources_api.json");

pub(super) fn parse_spec(spec_json: &str) -> oas3::Spec {
  oas3::from_json(spec_json).expect("failed to parse test spec")
}

pub(super) fn sources_spec() -> oas3::Spec {
  parse_spec(SOURCES_API)
}

/// Builder serving the sources fixture as version 3.1, with a private cache.
pub(super) fn sources_builder() -> SchemaBuilder {
  builder_for(sources_spec())
}

pub(super) fn builder_for(spec: oas3::Spec) -> SchemaBuilder {
  let documents = StaticDocuments::new().with_document("3.1", spec);
  SchemaBuilder::new(Arc::new(documents)).with_cache(Arc::new(SchemaCache::new()))
}

pub(super) fn request(uri: &str) -> http::request::Parts {
  http::Request::builder()
    .uri(uri)
    .body(())
    .expect("failed to build test request")
    .into_parts()
    .0
}

pub(super) fn overlay(value: Value) -> Overlay {
  serde_json::from_value(value).expect("failed to parse test overlay")
}
