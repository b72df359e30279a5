use regex::Regex;

fn remote_reference_patterns() -> &'static [Regex] {
  use std::sync::OnceLock;

  static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
  PATTERNS
    .get_or_init(|| {
      vec![
        Regex::new(r"^data:").expect("invalid data URI regex"),
        Regex::new(r"^#").expect("invalid fragment regex"),
        Regex::new(r"^[a-z]+://").expect("invalid scheme regex"),
      ]
    })
    .as_slice()
}

/// Determine whether a `url()` argument points at a local file that should be rebased.
///
/// Data URIs, bare fragments (SVG filter references and the like) and absolute URLs with a
/// lowercase scheme are left alone. Anything else, including an empty string, counts as local;
/// a reference that does not resolve to a readable file is caught later when the asset is read.
pub fn is_local_asset(url: &str) -> bool {
  !remote_reference_patterns()
    .iter()
    .any(|pattern| pattern.is_match(url))
}
