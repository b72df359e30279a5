//! Rebase options and the loader for the optional JSON configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Configuration file looked up by [`RebaseOptions::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "assets-rebase.config.json";

/// Options controlling where assets are copied and how references to them are written.
///
/// The options are fixed for the duration of a build pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RebaseOptions {
  /// Directory receiving copied assets. Rebasing is disabled while this is unset or empty.
  pub assets_path: Option<String>,
  /// Anchor `assets_path` to the output stylesheet's directory instead of the working directory.
  pub relative: bool,
  /// Suffix destination names with `_<n>` when different sources share a file name.
  pub rename_duplicates: bool,
}

impl RebaseOptions {
  /// Options with the given assets directory and every flag disabled.
  pub fn new(assets_path: impl Into<String>) -> Self {
    Self {
      assets_path: Some(assets_path.into()),
      ..Self::default()
    }
  }

  /// Builder-style toggle for [`RebaseOptions::relative`].
  pub fn with_relative(mut self, relative: bool) -> Self {
    self.relative = relative;
    self
  }

  /// Builder-style toggle for [`RebaseOptions::rename_duplicates`].
  pub fn with_rename_duplicates(mut self, rename: bool) -> Self {
    self.rename_duplicates = rename;
    self
  }

  /// The configured assets directory, if rebasing is enabled.
  pub fn assets_path(&self) -> Option<&str> {
    self
      .assets_path
      .as_deref()
      .filter(|path| !path.is_empty())
  }

  /// Whether an assets directory is configured.
  pub fn is_enabled(&self) -> bool {
    self.assets_path().is_some()
  }

  /// Attempt to load options from the provided directory.
  ///
  /// When the configuration file does not exist or fails to parse we fall back to the defaults,
  /// which leave rebasing disabled until an assets path is supplied some other way.
  pub fn discover(dir: &Path) -> Self {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    Self::from_path(&candidate).ok().unwrap_or_default()
  }

  /// Read options from a specific JSON file.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("failed to read configuration at {}", path.display()))?;
    serde_json::from_str(&content)
      .with_context(|| format!("failed to parse configuration at {}", path.display()))
  }

  /// Path of the configuration file inside `dir`.
  pub fn config_file(dir: &Path) -> PathBuf {
    dir.join(DEFAULT_CONFIG_FILE)
  }
}
