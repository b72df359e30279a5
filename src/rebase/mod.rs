//! Rebasing of local `url()` references into an assets directory.
//!
//! [`AssetRebaser`] drives a pass over declarations; destination resolution, duplicate tracking
//! and copying live in their own submodules.

mod copy;
mod registry;
mod resolve;
mod rewriter;

pub use copy::copy_asset;
pub use registry::{DuplicateRegistry, RebaseRecord};
pub use resolve::{AssetTarget, PathResolver, duplicate_path};
pub use rewriter::{AssetRebaser, PassSummary};
