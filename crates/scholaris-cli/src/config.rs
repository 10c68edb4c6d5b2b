//! Runtime configuration, deserialised from `scholaris.toml` and
//! `SCHOLARIS_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use scholaris_import::HeiAlias;
use scholaris_sheet::SourceLayout;
use serde::Deserialize;

fn default_store_path() -> PathBuf { PathBuf::from("scholaris.db") }
fn default_layout() -> String { "generic".to_owned() }

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  #[serde(default = "default_store_path")]
  pub store_path:     PathBuf,
  /// Layout used when `--layout` is not given.
  #[serde(default = "default_layout")]
  pub default_layout: String,
  /// Site-specific layouts; a name shared with a built-in replaces it.
  #[serde(default)]
  pub layouts:        Vec<SourceLayout>,
  /// Added to the built-in institution aliases.
  #[serde(default)]
  pub hei_aliases:    Vec<HeiAlias>,
}

impl AppConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("SCHOLARIS"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: AppConfig = settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
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

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use scholaris_sheet::{CreationPolicy, Field};

  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.store_path, PathBuf::from("scholaris.db"));
    assert_eq!(cfg.default_layout, "generic");
    assert!(cfg.layouts.is_empty());
  }

  #[test]
  fn layouts_and_aliases_load_from_toml() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
      file,
      r#"
store_path = "/var/lib/scholaris/registry.db"
default_layout = "capiz_billing"

[[layouts]]
name = "capiz_billing"
header_row = 3
hei_policy = "create_missing"

[layouts.columns]
"Name of Student" = "full_name"
"Amount Released" = "billing_amount"

[[hei_aliases]]
pattern = "FCU"
canonical = "Filamer Christian University"
"#
    )
    .unwrap();

    let cfg = AppConfig::load(file.path()).unwrap();
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/scholaris/registry.db"));
    let layout = &cfg.layouts[0];
    assert_eq!(layout.header_row, 3);
    assert_eq!(layout.chunk_size, 500);
    assert_eq!(layout.hei_policy, CreationPolicy::CreateMissing);
    // Header keys are normalised on use, so their stored case is irrelevant.
    assert!(layout.columns.values().any(|f| *f == Field::FullName));
    assert!(layout.columns.values().any(|f| *f == Field::BillingAmount));
    assert_eq!(cfg.hei_aliases[0].canonical, "Filamer Christian University");
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/scholaris.db")),
      PathBuf::from(home).join("scholaris.db")
    );
    assert_eq!(expand_tilde(Path::new("/tmp/x.db")), PathBuf::from("/tmp/x.db"));
  }
}
