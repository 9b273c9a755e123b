mod app;
mod cache;
mod config;
mod event;
mod logging;
mod movies;
mod notify;
mod query;
mod supabase;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "marquee")]
#[command(about = "Manage a movie rental inventory stored in Supabase")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/marquee/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Table holding the movies (overrides the config file)
  #[arg(short, long)]
  table: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(table) = args.table {
    config.table = table;
  }

  let _log_guard = logging::init(&config.log_level)?;
  tracing::info!(table = %config.table, "starting marquee");

  // Initialize and run the app
  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}
