use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{RebaseError, RebaseResult};

/// Write `contents` to `destination` unless a file already exists there.
///
/// Missing parent directories are created first. Existence alone gates the write, so an asset
/// whose source changed after its first copy keeps the stale bytes until the destination is
/// removed. Returns whether the file was written.
pub fn copy_asset(destination: &Path, contents: &[u8]) -> RebaseResult<bool> {
  if let Some(parent) = destination.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent).map_err(|source| RebaseError::Io {
      path: parent.to_path_buf(),
      source,
    })?;
  }

  if destination.exists() {
    debug!("asset {} already present, skipping copy", destination.display());
    return Ok(false);
  }

  fs::write(destination, contents).map_err(|source| RebaseError::Io {
    path: destination.to_path_buf(),
    source,
  })?;
  debug!("copied asset to {}", destination.display());

  Ok(true)
}
