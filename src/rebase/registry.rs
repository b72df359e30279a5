use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::warn;

use super::resolve::{AssetTarget, duplicate_path};

/// Destination previously assigned to a source asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebaseRecord {
  /// Resolved location of the referenced asset.
  pub source: PathBuf,
  /// Destination handed out the first time the source was rebased.
  pub target: AssetTarget,
}

/// Tracks which destination each source asset was given during a build.
///
/// Keys are resolved source paths, never destination names: the same source always maps back to
/// its first destination, while a different source whose file name collides is moved to a
/// `_<n>` suffixed name.
#[derive(Debug, Default)]
pub struct DuplicateRegistry {
  records: BTreeMap<PathBuf, RebaseRecord>,
  claimed: BTreeSet<PathBuf>,
}

impl DuplicateRegistry {
  /// Empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Destination recorded for `source`, if it was rebased before.
  pub fn lookup(&self, source: &Path) -> Option<&RebaseRecord> {
    self.records.get(source)
  }

  /// Remember that `source` was rebased to `target`.
  pub fn record(&mut self, source: &Path, target: AssetTarget) {
    self.claimed.insert(target.absolute.clone());
    self.records.insert(
      source.to_path_buf(),
      RebaseRecord {
        source: source.to_path_buf(),
        target,
      },
    );
  }

  /// Resolve the final destination for `source`, renaming on collision.
  ///
  /// A source seen before gets its recorded destination back unchanged. Otherwise the naive
  /// `target` is probed: while it exists on disk or belongs to another source in this registry,
  /// `_1`, `_2`, … suffixes are tried until a free name is found.
  pub fn assign(&mut self, source: &Path, target: AssetTarget) -> AssetTarget {
    if let Some(record) = self.lookup(source) {
      return record.target.clone();
    }

    let index = self.duplicate_index(&target.absolute);
    let target = if index > 0 {
      let renamed = target.with_duplicate_index(index);
      warn!(
        "duplicated path '{}' renamed to: {}",
        source.display(),
        renamed.relative.display()
      );
      renamed
    } else {
      target
    };

    self.record(source, target.clone());
    target
  }

  fn duplicate_index(&self, absolute: &Path) -> usize {
    if !self.is_taken(absolute) {
      return 0;
    }

    let mut index = 1;
    while self.is_taken(&duplicate_path(absolute, index)) {
      index += 1;
    }
    index
  }

  fn is_taken(&self, absolute: &Path) -> bool {
    absolute.exists() || self.claimed.contains(absolute)
  }

  /// Number of recorded sources.
  pub fn len(&self) -> usize {
    self.records.len()
  }

  /// Whether nothing has been recorded yet.
  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// Iterate over recorded sources in path order.
  pub fn records(&self) -> impl Iterator<Item = &RebaseRecord> {
    self.records.values()
  }

  /// Forget every recorded destination.
  pub fn clear(&mut self) {
    self.records.clear();
    self.claimed.clear();
  }
}
