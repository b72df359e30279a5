use std::path::{Path, PathBuf};

use crate::paths;

/// Destination of a rebased asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTarget {
  /// Where the asset is written on disk.
  pub absolute: PathBuf,
  /// Reference emitted into the stylesheet, relative to the output stylesheet's directory.
  pub relative: PathBuf,
}

impl AssetTarget {
  /// Both paths with `_<index>` inserted between the file stem and its extension.
  pub fn with_duplicate_index(&self, index: usize) -> Self {
    Self {
      absolute: duplicate_path(&self.absolute, index),
      relative: duplicate_path(&self.relative, index),
    }
  }
}

/// `dir/name.ext` becomes `dir/name_<index>.ext`.
pub fn duplicate_path(path: &Path, index: usize) -> PathBuf {
  let stem = path
    .file_stem()
    .map(|stem| stem.to_string_lossy().into_owned())
    .unwrap_or_default();
  let name = match path.extension() {
    Some(ext) => format!("{stem}_{index}.{}", ext.to_string_lossy()),
    None => format!("{stem}_{index}"),
  };
  path.with_file_name(name)
}

/// Resolves where a referenced asset lives and where its copy should go.
#[derive(Debug, Clone)]
pub struct PathResolver<'a> {
  cwd: &'a Path,
  assets_path: &'a str,
  relative: bool,
}

impl<'a> PathResolver<'a> {
  /// Resolver anchored to `cwd` writing into `assets_path`.
  ///
  /// With `relative` set the assets directory is taken relative to the output stylesheet's
  /// directory and emitted verbatim; otherwise it is anchored to `cwd` and the emitted reference is
  /// computed from the output directory.
  pub fn new(cwd: &'a Path, assets_path: &'a str, relative: bool) -> Self {
    Self {
      cwd,
      assets_path,
      relative,
    }
  }

  /// Absolute location of `clear_url` relative to the declaring stylesheet's directory.
  pub fn source_path(&self, source_dir: &Path, clear_url: &str) -> PathBuf {
    paths::resolve(self.cwd, source_dir, Path::new(clear_url))
  }

  /// Destination pair for `clear_url` when the stylesheet is written into `output_dir`.
  pub fn target(&self, output_dir: &Path, clear_url: &str) -> AssetTarget {
    let file_name = Path::new(paths::basename(clear_url));
    let assets_path = Path::new(self.assets_path);

    let (absolute_base, relative_base) = if self.relative {
      (
        paths::resolve(self.cwd, output_dir, assets_path),
        assets_path.to_path_buf(),
      )
    } else {
      let absolute = paths::absolutize(self.cwd, assets_path);
      let relative = paths::relative(&paths::absolutize(self.cwd, output_dir), &absolute);
      (absolute, relative)
    };

    AssetTarget {
      absolute: paths::join(&absolute_base, file_name),
      relative: paths::join(&relative_base, file_name),
    }
  }
}
