//! Runtime configuration: an optional TOML file overlaid with `GIGBOARD_*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use gigboard_session::{ProfileLookup, RetryPolicy};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// SQLite file holding accounts, the current session and all documents.
  pub store_path:           PathBuf,
  pub host:                 String,
  pub port:                 u16,
  /// Delay between profile reads while a session resolves.
  pub profile_retry_ms:     u64,
  /// Stop looking for a profile after this many reads. Unset: keep going
  /// until interrupted.
  pub max_profile_attempts: Option<u32>,
  /// Collections searched for a profile, in order.
  pub profile_lookup:       ProfileLookup,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      store_path:           PathBuf::from("~/.local/share/gigboard/gigboard.db"),
      host:                 "127.0.0.1".to_string(),
      port:                 8080,
      profile_retry_ms:     1000,
      max_profile_attempts: None,
      profile_lookup:       ProfileLookup::default(),
    }
  }
}

impl Settings {
  /// Read `file` (if it exists) and the environment.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(
        config::Environment::with_prefix("GIGBOARD")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("profile_lookup"),
      )
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise Settings")
  }

  pub fn retry_policy(&self) -> RetryPolicy {
    RetryPolicy {
      profile_retry:        Duration::from_millis(self.profile_retry_ms),
      max_profile_attempts: self.max_profile_attempts,
    }
  }

  /// `store_path` with a leading `~` expanded.
  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
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
  use gigboard_core::document::Collection;

  use super::*;

  #[test]
  fn defaults_apply_without_a_file() {
    let settings = Settings::load(Path::new("/nonexistent/gigboard.toml")).unwrap();
    assert_eq!(settings.port, 8080);
    assert_eq!(settings.retry_policy(), RetryPolicy::default());
    assert_eq!(
      settings.profile_lookup.order(),
      &[Collection::Users, Collection::Employers, Collection::Employees]
    );
  }

  #[test]
  fn file_values_override_defaults() {
    let dir = std::env::temp_dir().join(format!("gigboard-settings-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("gigboard.toml");
    std::fs::write(
      &file,
      r#"
        port = 9000
        profile_retry_ms = 250
        max_profile_attempts = 4
        profile_lookup = ["employees", "users"]
      "#,
    )
    .unwrap();

    let settings = Settings::load(&file).unwrap();
    assert_eq!(settings.address(), "127.0.0.1:9000");
    assert_eq!(
      settings.retry_policy(),
      RetryPolicy {
        profile_retry:        Duration::from_millis(250),
        max_profile_attempts: Some(4),
      }
    );
    assert_eq!(settings.profile_lookup.order(), &[Collection::Employees, Collection::Users]);

    std::fs::remove_dir_all(&dir).ok();
  }

  #[test]
  fn invalid_lookup_order_is_rejected() {
    let dir = std::env::temp_dir().join(format!("gigboard-settings-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("gigboard.toml");
    std::fs::write(&file, r#"profile_lookup = ["jobs"]"#).unwrap();

    assert!(Settings::load(&file).is_err());
    std::fs::remove_dir_all(&dir).ok();
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/x/y.db")), PathBuf::from(home).join("x/y.db"));
    assert_eq!(expand_tilde(Path::new("/abs/y.db")), PathBuf::from("/abs/y.db"));
  }
}
