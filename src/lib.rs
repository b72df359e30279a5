#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_url;
pub mod builder;
pub mod config;
pub mod declaration;
pub mod error;
pub mod paths;
pub mod rebase;
pub mod stylesheet;

pub use builder::{RebasedStylesheet, StylesheetBuilder};
pub use config::RebaseOptions;
pub use declaration::Declaration;
pub use error::{RebaseError, RebaseResult};
pub use rebase::{AssetRebaser, AssetTarget, DuplicateRegistry, PassSummary, RebaseRecord};
pub use stylesheet::{StyleDeclaration, Stylesheet};
