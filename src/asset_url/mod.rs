//! Helpers for locating, classifying and rebuilding `url()` references.
//!
//! Extraction of calls from a declaration value, classification of the argument and
//! splitting/recomposition of the reference live in separate submodules so each step can be
//! tested on its own.

mod calls;
mod filters;
mod parts;

pub use calls::{FunctionCall, find_url_calls, replace_url_calls};
pub use filters::is_local_asset;
pub use parts::{UrlParts, UrlToken, compose_rebased_url, compose_url, normalize_separators};
