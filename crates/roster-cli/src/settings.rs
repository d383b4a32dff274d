//! Runtime configuration: optional TOML file, then `ROSTER_*` environment
//! variables. Command-line flags are applied on top by `main`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use roster_core::removal::OrphanedReports;
use serde::Deserialize;

/// How listings are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
  /// Aligned text columns.
  #[default]
  Table,
  /// Pretty-printed JSON arrays.
  Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  #[serde(default = "default_database")]
  pub database:         PathBuf,
  #[serde(default)]
  pub output:           OutputFormat,
  #[serde(default)]
  pub orphaned_reports: OrphanedReports,
}

fn default_database() -> PathBuf { PathBuf::from("roster.db") }

fn environment() -> config::Environment { config::Environment::with_prefix("ROSTER") }

impl Settings {
  /// Read `path` if it exists, then overlay `ROSTER_*` variables from the
  /// process environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::load_with(path, environment())
  }

  fn load_with(path: &Path, env: config::Environment) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(env)
      .build()
      .context("failed to read config file")?;

    let mut settings: Settings = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;
    settings.database = expand_tilde(&settings.database);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
