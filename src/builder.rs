//! Stylesheet-level orchestration: scan a sheet, rebase its declarations, write the result.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::RebaseOptions;
use crate::error::RebaseResult;
use crate::rebase::{AssetRebaser, PassSummary};
use crate::stylesheet::Stylesheet;

/// Output of rebasing a stylesheet held in memory.
#[derive(Debug, Clone)]
pub struct RebasedStylesheet {
  /// Serialised stylesheet with rewritten `url()` references.
  pub css: String,
  /// Counters describing the pass.
  pub summary: PassSummary,
}

/// High-level helper running rebase passes over whole stylesheets.
///
/// A builder owns one [`AssetRebaser`], so every stylesheet passed through it shares the same
/// duplicate registry.
#[derive(Debug)]
pub struct StylesheetBuilder {
  rebaser: AssetRebaser,
}

impl StylesheetBuilder {
  /// Builder resolving paths against the process working directory.
  pub fn new(options: RebaseOptions) -> Self {
    Self::from_rebaser(AssetRebaser::new(options))
  }

  /// Wrap an already configured rebaser.
  pub fn from_rebaser(rebaser: AssetRebaser) -> Self {
    Self { rebaser }
  }

  /// The underlying rebaser.
  pub fn rebaser(&self) -> &AssetRebaser {
    &self.rebaser
  }

  /// Mutable access to the underlying rebaser, e.g. to reset it between builds.
  pub fn rebaser_mut(&mut self) -> &mut AssetRebaser {
    &mut self.rebaser
  }

  /// Rebase the stylesheet text `css`.
  ///
  /// `source_file` is the stylesheet's own location, used to resolve relative references;
  /// `output_file` is where the result will be written.
  pub fn rebase_str(
    &mut self,
    css: &str,
    source_file: Option<&Path>,
    output_file: Option<&Path>,
  ) -> RebaseResult<RebasedStylesheet> {
    let mut sheet = Stylesheet::parse(css, source_file);
    let summary = self
      .rebaser
      .process_declarations(sheet.declarations_mut(), output_file)?;

    Ok(RebasedStylesheet {
      css: sheet.to_css(),
      summary,
    })
  }

  /// Read `input`, rebase it for `output` and write the result there.
  pub fn rebase_file(&mut self, input: &Path, output: &Path) -> Result<PassSummary> {
    let css = fs::read_to_string(input)
      .with_context(|| format!("failed to read stylesheet at {}", input.display()))?;

    let rebased = self
      .rebase_str(&css, Some(input), Some(output))
      .with_context(|| format!("failed to rebase {}", input.display()))?;

    if let Some(parent) = output.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(output, &rebased.css)
      .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
      "rebased {} reference(s) in {} ({} copied, {} missing)",
      rebased.summary.rebased,
      output.display(),
      rebased.summary.copied,
      rebased.summary.missing
    );

    Ok(rebased.summary)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn rebases_file_and_writes_output() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src/img")).unwrap();
    fs::write(root.join("src/img/bg.png"), b"png").unwrap();
    fs::write(
      root.join("src/index.css"),
      ".hero { background: url('img/bg.png') center; color: red }\n",
    )
    .unwrap();

    let options = RebaseOptions::new("assets").with_relative(true);
    let mut builder =
      StylesheetBuilder::from_rebaser(AssetRebaser::new(options).with_working_dir(root));
    let summary = builder
      .rebase_file(&root.join("src/index.css"), &root.join("dist/index.css"))
      .unwrap();

    assert_eq!(summary.rebased, 1);
    assert_eq!(summary.copied, 1);
    assert_eq!(
      fs::read_to_string(root.join("dist/index.css")).unwrap(),
      ".hero { background: url(assets/bg.png) center; color: red }\n"
    );
    assert_eq!(fs::read(root.join("dist/assets/bg.png")).unwrap(), b"png");
  }

  #[test]
  fn disabled_builder_leaves_css_untouched() {
    let css = ".a { background: url(a.png) }";
    let mut builder = StylesheetBuilder::new(RebaseOptions::default());
    let rebased = builder.rebase_str(css, None, None).unwrap();

    assert_eq!(rebased.css, css);
    assert!(!rebased.summary.enabled);
  }

  #[test]
  fn missing_input_reports_context() {
    let dir = tempdir().unwrap();
    let mut builder = StylesheetBuilder::new(RebaseOptions::new("assets"));
    let err = builder
      .rebase_file(&dir.path().join("missing.css"), &dir.path().join("out.css"))
      .unwrap_err();

    assert!(err.to_string().contains("failed to read stylesheet"));
  }
}
