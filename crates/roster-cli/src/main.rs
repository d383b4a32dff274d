//! `roster`: interactive manager for department, occupation and employee
//! records.
//!
//! # Usage
//!
//! ```text
//! roster --database roster.db
//! roster --config ~/.config/roster/roster.toml --output json
//! ```

mod app;
mod console;
mod menu;
mod render;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use console::TerminalConsole;
use roster_store_sqlite::SqliteStore;
use settings::{OutputFormat, Settings, expand_tilde};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "roster", version, about = "Manage departments, occupations and employees")]
struct Args {
  /// Path to a TOML config file (database, output, orphaned_reports).
  #[arg(short, long, value_name = "FILE", default_value = "roster.toml")]
  config: PathBuf,

  /// SQLite database file. Overrides the config file and `ROSTER_DATABASE`.
  #[arg(long, value_name = "PATH")]
  database: Option<PathBuf>,

  /// How listings are printed.
  #[arg(long, value_enum)]
  output: Option<OutputFormat>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  // Flags override the environment, which overrides the config file.
  let mut settings = Settings::load(&expand_tilde(&args.config))?;
  if let Some(database) = args.database {
    settings.database = expand_tilde(&database);
  }
  if let Some(output) = args.output {
    settings.output = output;
  }

  let store = SqliteStore::open(&settings.database)
    .await
    .with_context(|| format!("failed to open database at {}", settings.database.display()))?
    .with_orphaned_reports(settings.orphaned_reports);
  tracing::info!(
    database = %settings.database.display(),
    orphaned_reports = ?settings.orphaned_reports,
    "store opened"
  );

  let mut app = App::new(store, TerminalConsole::new(), settings.output);
  let outcome = app.run().await;

  let (store, _) = app.into_parts();
  store.close().await.context("closing database")?;
  outcome
}
