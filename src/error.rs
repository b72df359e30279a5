//! Error type shared by the rebasing pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type RebaseResult<T> = Result<T, RebaseError>;

/// Failures that abort rewriting a declaration.
///
/// A missing source asset is not represented here: it is reported as a warning and the
/// reference is left untouched.
#[derive(Debug, Error)]
pub enum RebaseError {
  /// A function call such as `url(` has no balancing closing parenthesis.
  #[error("{name}(): missing closing ')' in '{value}'")]
  UnclosedCall {
    /// Function name that was being extracted.
    name: String,
    /// Declaration value containing the call.
    value: String,
  },
  /// A `url()` call carries no argument to rebase.
  #[error("url() without an argument in '{value}'")]
  EmptyToken {
    /// Declaration value containing the call.
    value: String,
  },
  /// Creating the destination directory or writing the asset failed.
  #[error("failed to write asset {}", path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
}
