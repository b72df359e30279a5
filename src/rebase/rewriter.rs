use std::env;
use std::fs;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::copy::copy_asset;
use super::registry::DuplicateRegistry;
use super::resolve::PathResolver;
use crate::asset_url::{
  UrlParts, UrlToken, compose_rebased_url, compose_url, is_local_asset, replace_url_calls,
};
use crate::config::RebaseOptions;
use crate::declaration::Declaration;
use crate::error::{RebaseError, RebaseResult};
use crate::paths;

/// Counters describing what a pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
  /// Whether rebasing was enabled for the pass.
  pub enabled: bool,
  /// Declarations containing at least one `url()` call that were processed.
  pub declarations: usize,
  /// Local references pointed at the assets directory.
  pub rebased: usize,
  /// Local references left untouched because the asset could not be read.
  pub missing: usize,
  /// Assets written to disk; references to an already present destination are not counted.
  pub copied: usize,
}

impl AddAssign for PassSummary {
  fn add_assign(&mut self, other: Self) {
    self.enabled |= other.enabled;
    self.declarations += other.declarations;
    self.rebased += other.rebased;
    self.missing += other.missing;
    self.copied += other.copied;
  }
}

/// Rewrites `url()` references in declarations and copies the referenced assets.
///
/// Each rebaser owns its [`DuplicateRegistry`], so separate builds in one process do not share
/// rename decisions. Use one rebaser for every stylesheet of a build and call
/// [`AssetRebaser::reset`] (or create a new one) before the next build.
#[derive(Debug)]
pub struct AssetRebaser {
  options: RebaseOptions,
  cwd: PathBuf,
  registry: DuplicateRegistry,
  warned_disabled: bool,
}

impl AssetRebaser {
  /// Rebaser resolving relative paths against the process working directory.
  pub fn new(options: RebaseOptions) -> Self {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    Self {
      options,
      cwd,
      registry: DuplicateRegistry::new(),
      warned_disabled: false,
    }
  }

  /// Resolve relative paths against `cwd` instead of the process working directory.
  pub fn with_working_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
    self.cwd = cwd.into();
    self
  }

  /// Options the rebaser was created with.
  pub fn options(&self) -> &RebaseOptions {
    &self.options
  }

  /// Directory relative paths are anchored to.
  pub fn working_dir(&self) -> &Path {
    &self.cwd
  }

  /// Destinations assigned so far.
  pub fn registry(&self) -> &DuplicateRegistry {
    &self.registry
  }

  /// Forget every assigned destination, starting a new build.
  pub fn reset(&mut self) {
    self.registry.clear();
    self.warned_disabled = false;
  }

  /// Directory of the output stylesheet, `.` when unknown.
  pub fn output_dir(output_file: Option<&Path>) -> PathBuf {
    output_file
      .map(paths::dirname)
      .unwrap_or_else(|| PathBuf::from("."))
  }

  /// Run one stylesheet pass over `declarations`, in order.
  ///
  /// `output_file` is where the stylesheet will be written; only its directory matters. When no
  /// assets path is configured the declarations are left alone and a warning is logged. The first
  /// malformed `url()` call aborts the pass; declarations processed before it keep their new values.
  pub fn process_declarations<I, D>(
    &mut self,
    declarations: I,
    output_file: Option<&Path>,
  ) -> RebaseResult<PassSummary>
  where
    I: IntoIterator<Item = D>,
    D: Declaration,
  {
    let mut summary = PassSummary::default();
    if !self.options.is_enabled() {
      self.warn_disabled();
      return Ok(summary);
    }
    summary.enabled = true;

    let output_dir = Self::output_dir(output_file);
    for mut declaration in declarations {
      summary += self.process_declaration(&mut declaration, &output_dir)?;
    }

    Ok(summary)
  }

  /// Rewrite every `url()` call of a single declaration.
  ///
  /// Declarations without `url(` in their value are skipped. On error the value is not modified.
  pub fn process_declaration<D>(
    &mut self,
    declaration: &mut D,
    output_dir: &Path,
  ) -> RebaseResult<PassSummary>
  where
    D: Declaration + ?Sized,
  {
    let mut summary = PassSummary::default();
    if !self.options.is_enabled() {
      self.warn_disabled();
      return Ok(summary);
    }
    summary.enabled = true;

    if !declaration.value().contains("url(") {
      return Ok(summary);
    }

    let source_dir = declaration
      .source_file()
      .map(paths::dirname)
      .unwrap_or_else(|| self.cwd.clone());
    let value = declaration.value().to_string();

    let rewritten = replace_url_calls(&value, |raw| {
      let token = UrlToken::parse(raw).ok_or_else(|| RebaseError::EmptyToken {
        value: value.clone(),
      })?;

      if is_local_asset(token.url) {
        self.rebase_url(&token, &source_dir, output_dir, &mut summary)
      } else {
        Ok(compose_url(&token))
      }
    })?;

    declaration.set_value(rewritten);
    summary.declarations += 1;
    Ok(summary)
  }

  fn rebase_url(
    &mut self,
    token: &UrlToken,
    source_dir: &Path,
    output_dir: &Path,
    summary: &mut PassSummary,
  ) -> RebaseResult<String> {
    let assets_path = self.options.assets_path().unwrap_or_default();
    let resolver = PathResolver::new(&self.cwd, assets_path, self.options.relative);

    let parts = UrlParts::split(token.url);
    let source = resolver.source_path(source_dir, parts.path);

    let contents = match fs::read(&source) {
      Ok(contents) => contents,
      Err(_) => {
        warn!("can't read file '{}', ignoring", source.display());
        summary.missing += 1;
        return Ok(compose_url(token));
      }
    };

    let mut target = resolver.target(output_dir, parts.path);
    if self.options.rename_duplicates {
      target = self.registry.assign(&source, target);
    }

    if copy_asset(&target.absolute, &contents)? {
      summary.copied += 1;
    }
    summary.rebased += 1;
    debug!(
      "rebased '{}' to '{}'",
      token.url,
      target.relative.display()
    );

    let reference = format!("{}{}", paths::to_slash(&target.relative), parts.postfix);
    Ok(compose_rebased_url(&reference))
  }

  fn warn_disabled(&mut self) {
    if !self.warned_disabled {
      warn!("no assets path provided, aborting");
      self.warned_disabled = true;
    }
  }
}
