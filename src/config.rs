use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub supabase: SupabaseConfig,
  /// Table holding the movie rows
  #[serde(default = "default_table")]
  pub table: String,
  /// Custom title for header (defaults to "Movie Rental Management")
  pub title: Option<String>,
  /// Log filter used when MARQUEE_LOG is not set
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
  /// Project URL, e.g. https://<project>.supabase.co
  pub url: String,
  /// Postgres schema exposed through PostgREST (defaults to the project's default)
  pub schema: Option<String>,
}

fn default_table() -> String {
  "movies".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./marquee.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/marquee/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/marquee/config.yaml\n\
                 with at least `supabase: {{ url: https://<project>.supabase.co }}`."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("marquee.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("marquee").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(contents)
  }

  /// Header title
  pub fn title(&self) -> &str {
    self.title.as_deref().unwrap_or("Movie Rental Management")
  }

  /// Get the Supabase API key from environment variables.
  ///
  /// Checks MARQUEE_SUPABASE_KEY first, then SUPABASE_ANON_KEY as fallback.
  pub fn get_api_key() -> Result<String> {
    std::env::var("MARQUEE_SUPABASE_KEY")
      .or_else(|_| std::env::var("SUPABASE_ANON_KEY"))
      .map_err(|_| {
        eyre!(
          "Supabase API key not found. Set MARQUEE_SUPABASE_KEY or SUPABASE_ANON_KEY environment variable."
        )
      })
  }
}
