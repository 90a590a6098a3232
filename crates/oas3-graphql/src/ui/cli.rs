use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use oas3_graphql::GenerationMode;

#[derive(Parser, Debug)]
#[command(name = "oas3-graphql")]
#[command(author, version, about = "OpenAPI to GraphQL schema generator")]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose output with detailed progress information
  #[arg(short, long, default_value_t = false, global = true)]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false, global = true, conflicts_with = "verbose")]
  pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// List information from OpenAPI specification
  List {
    #[command(subcommand)]
    list_command: ListCommands,
  },
  /// Generate a GraphQL schema from an OpenAPI specification
  Generate(GenerateCommand),
}

#[derive(Args, Debug)]
pub struct GenerateCommand {
  /// Path to the OpenAPI JSON or YAML specification file
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,

  /// Path where the generated SDL will be written (stdout when omitted)
  #[arg(short, long, value_name = "FILE")]
  pub output: Option<PathBuf>,

  /// API version to generate for (defaults to MAJOR.MINOR of info.version)
  #[arg(long, value_name = "VERSION")]
  pub api_version: Option<String>,

  /// Shape of the root query accessors
  #[arg(long, value_enum, default_value = "legacy")]
  pub pagination: PaginationMode,

  /// JSON overlay of per-collection customizations, keyed by collection pattern
  #[arg(long, value_name = "FILE")]
  pub overlay: Option<PathBuf>,

  /// Directory with model_type/query_type/schema.graphql template overrides
  #[arg(long, value_name = "DIR")]
  pub templates: Option<PathBuf>,

  /// Columns never exposed for a model (e.g., Endpoint=password,token)
  #[arg(long, value_name = "CLASS=COLUMNS")]
  pub encrypted_columns: Option<Vec<String>>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaginationMode {
  /// Accessors return a list of records
  Legacy,
  /// Accessors return a collection with `meta` and `data`
  V2,
}

impl From<PaginationMode> for GenerationMode {
  fn from(mode: PaginationMode) -> Self {
    match mode {
      PaginationMode::Legacy => Self::Legacy,
      PaginationMode::V2 => Self::PaginationV2,
    }
  }
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
  /// List the collections that become GraphQL types
  Collections {
    /// Path to the OpenAPI JSON or YAML specification file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
  },
}
