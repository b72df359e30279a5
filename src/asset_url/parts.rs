use std::borrow::Cow;

/// Argument of a `url()` call with one layer of matching quotes removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlToken<'a> {
  /// Reference inside the quotes.
  pub url: &'a str,
  /// Quote character that wrapped the reference, if any.
  pub quote: Option<char>,
}

impl<'a> UrlToken<'a> {
  /// Strip a balanced pair of single or double quotes surrounding `raw`.
  ///
  /// Returns `None` for an empty argument. Unbalanced or empty quotes are kept as part of the
  /// reference.
  pub fn parse(raw: &'a str) -> Option<Self> {
    if raw.is_empty() {
      return None;
    }

    for quote in ['"', '\''] {
      if raw.len() > 2 && raw.starts_with(quote) && raw.ends_with(quote) {
        return Some(Self {
          url: &raw[1..raw.len() - 1],
          quote: Some(quote),
        });
      }
    }

    Some(Self {
      url: raw,
      quote: None,
    })
  }
}

/// Reference split into its filesystem path and the verbatim query/fragment postfix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlParts<'a> {
  /// Path portion used to locate the asset.
  pub path: &'a str,
  /// Query string and fragment, each with its leading `?`/`#`, re-appended after rebasing.
  pub postfix: &'a str,
}

impl<'a> UrlParts<'a> {
  /// Split `url` at the first `?` or `#`, whichever marks the start of the postfix.
  pub fn split(url: &'a str) -> Self {
    let hash = url.find('#').unwrap_or(url.len());
    let end = url[..hash].find('?').unwrap_or(hash);

    Self {
      path: &url[..end],
      postfix: &url[end..],
    }
  }
}

/// Replace native path separators with forward slashes.
pub fn normalize_separators(url: &str) -> Cow<'_, str> {
  if std::path::MAIN_SEPARATOR == '\\' && url.contains('\\') {
    Cow::Owned(url.replace('\\', "/"))
  } else {
    Cow::Borrowed(url)
  }
}

/// Rebuild a `url()` call for a reference that keeps its original quoting.
pub fn compose_url(token: &UrlToken) -> String {
  let url = normalize_separators(token.url);
  match token.quote {
    Some(quote) => format!("url({quote}{url}{quote})"),
    None => format!("url({url})"),
  }
}

/// Build a `url()` call for a rebased reference.
///
/// The reference is emitted bare unless it contains characters that would end an unquoted
/// `url()` token, in which case it is double quoted.
pub fn compose_rebased_url(url: &str) -> String {
  let url = normalize_separators(url);
  let needs_quotes = url
    .chars()
    .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\''));

  if needs_quotes {
    format!("url(\"{}\")", url.replace('"', "\\\""))
  } else {
    format!("url({url})")
  }
}
