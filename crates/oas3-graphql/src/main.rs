#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::ui::{Cli, Commands, ListCommands};

mod ui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  setup_tracing(cli.verbose, cli.quiet);

  match cli.command {
    Commands::List { list_command } => match list_command {
      ListCommands::Collections { input } => ui::commands::list_collections(&input).await?,
    },
    Commands::Generate(command) => {
      let config = ui::commands::GenerateConfig::from_command(command)?;
      ui::commands::generate_schema(config).await?;
    }
  }

  Ok(())
}

/// `RUST_LOG` wins; otherwise `--quiet` and `--verbose` pick the level.
fn setup_tracing(verbose: bool, quiet: bool) {
  let default_level = match (verbose, quiet) {
    (_, true) => LevelFilter::ERROR,
    (true, false) => LevelFilter::DEBUG,
    (false, false) => LevelFilter::INFO,
  };
  let filter = EnvFilter::builder()
    .with_default_directive(default_level.into())
    .from_env_lossy();

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
}
