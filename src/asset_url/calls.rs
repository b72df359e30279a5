use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{RebaseError, RebaseResult};

/// A single function call located inside a declaration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall<'a> {
  /// Byte range of the whole call, from the function name to the closing parenthesis.
  pub span: Range<usize>,
  /// Text between the outer parentheses, untrimmed.
  pub body: &'a str,
}

fn url_call_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"\burl\(").expect("invalid url() regex"))
}

/// Locate every top-level `url(...)` call in `value`, left to right.
///
/// Parentheses inside the argument are balanced, so `url(data:image/svg+xml,<svg>(…)</svg>)` is
/// captured as one call and commas or semicolons inside the argument never split it.
pub fn find_url_calls(value: &str) -> RebaseResult<Vec<FunctionCall<'_>>> {
  find_calls(value, "url", url_call_pattern())
}

fn find_calls<'a>(
  value: &'a str,
  name: &str,
  pattern: &Regex,
) -> RebaseResult<Vec<FunctionCall<'a>>> {
  let mut calls = Vec::new();
  let mut cursor = 0;

  while let Some(found) = pattern.find_at(value, cursor) {
    let open = found.end() - 1;
    let Some(close) = matching_paren(value, open) else {
      return Err(RebaseError::UnclosedCall {
        name: name.to_string(),
        value: value.to_string(),
      });
    };

    calls.push(FunctionCall {
      span: found.start()..close + 1,
      body: &value[open + 1..close],
    });
    cursor = close + 1;
  }

  Ok(calls)
}

fn matching_paren(value: &str, open: usize) -> Option<usize> {
  let mut depth = 0usize;
  for (offset, byte) in value.as_bytes()[open..].iter().enumerate() {
    match byte {
      b'(' => depth += 1,
      b')' => {
        depth -= 1;
        if depth == 0 {
          return Some(open + offset);
        }
      }
      _ => {}
    }
  }
  None
}

/// Replace each `url(...)` call in `value` with the output of `replace`, which receives the
/// call's trimmed argument.
pub fn replace_url_calls<F>(value: &str, mut replace: F) -> RebaseResult<String>
where
  F: FnMut(&str) -> RebaseResult<String>,
{
  let calls = find_url_calls(value)?;
  let mut output = String::with_capacity(value.len());
  let mut last = 0;

  for call in calls {
    output.push_str(&value[last..call.span.start]);
    output.push_str(&replace(call.body.trim())?);
    last = call.span.end;
  }
  output.push_str(&value[last..]);

  Ok(output)
}
