//! Lexical path arithmetic used while resolving asset destinations.
//!
//! Resolution never touches the filesystem: `..` segments are folded textually and relative
//! inputs are anchored to an explicit working directory, so callers get identical answers for
//! assets that do not exist yet (destinations) and assets that do (sources).

use std::path::{Component, Path, PathBuf};

/// Fold `.` and `..` segments without consulting the filesystem.
///
/// Leading `..` segments of a relative path are preserved, while `..` directly below the root of
/// an absolute path is dropped. An empty result collapses to `.`.
pub fn normalize(path: &Path) -> PathBuf {
  let mut parts: Vec<Component> = Vec::new();

  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => match parts.last() {
        Some(Component::Normal(_)) => {
          parts.pop();
        }
        Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
        _ => parts.push(component),
      },
      other => parts.push(other),
    }
  }

  if parts.is_empty() {
    PathBuf::from(".")
  } else {
    parts.iter().collect()
  }
}

/// Anchor `path` to `cwd` unless it is already absolute, then normalise it.
pub fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
  normalize(&cwd.join(path))
}

/// Resolve `path` against `base`, with `base` itself anchored to `cwd`.
pub fn resolve(cwd: &Path, base: &Path, path: &Path) -> PathBuf {
  absolutize(cwd, &base.join(path))
}

/// Join two path fragments and normalise the result, keeping relative inputs relative.
pub fn join(base: &Path, name: &Path) -> PathBuf {
  if base.as_os_str().is_empty() {
    return normalize(name);
  }
  normalize(&base.join(name))
}

/// Compute the path leading from the `from` directory to `to`.
///
/// Both inputs are expected to be absolute and normalised. Identical inputs produce an empty path.
pub fn relative(from: &Path, to: &Path) -> PathBuf {
  let from: Vec<Component> = from.components().collect();
  let to: Vec<Component> = to.components().collect();

  let common = from
    .iter()
    .zip(to.iter())
    .take_while(|(left, right)| left == right)
    .count();

  let mut result = PathBuf::new();
  for _ in common..from.len() {
    result.push("..");
  }
  for component in &to[common..] {
    result.push(component);
  }
  result
}

/// Directory portion of `path`, treating a bare file name as living in `.`.
pub fn dirname(path: &Path) -> PathBuf {
  match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
    Some(_) => PathBuf::from("."),
    None => path.to_path_buf(),
  }
}

/// Final segment of a slash separated reference, e.g. `logo.png` for `../img/logo.png`.
pub fn basename(reference: &str) -> &str {
  let trimmed = reference.trim_end_matches(['/', '\\']);
  trimmed
    .rsplit(['/', '\\'])
    .next()
    .unwrap_or(trimmed)
}

/// Render a path with forward slashes regardless of the host separator.
pub fn to_slash(path: &Path) -> String {
  let text = path.to_string_lossy();
  if std::path::MAIN_SEPARATOR == '\\' {
    text.replace('\\', "/")
  } else {
    text.into_owned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_folds_parent_segments() {
    assert_eq!(
      normalize(Path::new("/project/src/../img/./a.png")),
      PathBuf::from("/project/img/a.png")
    );
    assert_eq!(normalize(Path::new("../a/../b")), PathBuf::from("../b"));
    assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
    assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
  }

  #[test]
  fn resolve_anchors_relative_base_to_cwd() {
    let resolved = resolve(Path::new("/project"), Path::new("src"), Path::new("../img/a.png"));
    assert_eq!(resolved, PathBuf::from("/project/img/a.png"));
  }

  #[test]
  fn resolve_keeps_absolute_references() {
    let resolved = resolve(Path::new("/project"), Path::new("src"), Path::new("/static/a.png"));
    assert_eq!(resolved, PathBuf::from("/static/a.png"));
  }

  #[test]
  fn relative_walks_up_and_down() {
    assert_eq!(
      relative(Path::new("/project/dist/css"), Path::new("/project/dist/assets")),
      PathBuf::from("../assets")
    );
    assert_eq!(
      relative(Path::new("/project/dist"), Path::new("/project/dist")),
      PathBuf::new()
    );
  }

  #[test]
  fn join_handles_empty_base() {
    assert_eq!(join(Path::new(""), Path::new("a.png")), PathBuf::from("a.png"));
    assert_eq!(
      join(Path::new("./assets"), Path::new("a.png")),
      PathBuf::from("assets/a.png")
    );
  }

  #[test]
  fn dirname_of_bare_file_is_current_dir() {
    assert_eq!(dirname(Path::new("index.css")), PathBuf::from("."));
    assert_eq!(dirname(Path::new("dist/index.css")), PathBuf::from("dist"));
  }

  #[test]
  fn basename_takes_last_segment() {
    assert_eq!(basename("../img/logo.png"), "logo.png");
    assert_eq!(basename("logo.png"), "logo.png");
  }
}
