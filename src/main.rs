//! Command line entry point rebasing the assets of a single stylesheet.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use css_assets_rebase::{RebaseOptions, StylesheetBuilder};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "css-assets-rebase")]
#[command(version, about = "Copy stylesheet assets into an assets directory and rewrite url() references", long_about = None)]
struct Cli {
  /// Stylesheet to process
  input: PathBuf,

  /// Where the rewritten stylesheet is written
  #[arg(short, long)]
  output: PathBuf,

  /// Directory receiving copied assets
  #[arg(long)]
  assets_path: Option<String>,

  /// Treat the assets path as relative to the output stylesheet's directory
  #[arg(long)]
  relative: bool,

  /// Rename assets whose file names collide with a different source
  #[arg(long)]
  rename_duplicates: bool,

  /// JSON configuration file (defaults to assets-rebase.config.json in the working directory)
  #[arg(long)]
  config: Option<PathBuf>,
}

impl Cli {
  fn options(&self) -> Result<RebaseOptions> {
    let mut options = match &self.config {
      Some(path) => RebaseOptions::from_path(path)?,
      None => RebaseOptions::discover(&env::current_dir().context("failed to read working directory")?),
    };

    if let Some(assets_path) = &self.assets_path {
      options.assets_path = Some(assets_path.clone());
    }
    options.relative |= self.relative;
    options.rename_duplicates |= self.rename_duplicates;
    Ok(options)
  }
}

fn main() -> Result<()> {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "css_assets_rebase=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let cli = Cli::parse();
  let options = cli.options()?;

  let mut builder = StylesheetBuilder::new(options);
  builder.rebase_file(&cli.input, &cli.output)?;
  Ok(())
}
