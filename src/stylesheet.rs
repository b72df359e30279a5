//! Minimal stylesheet scanner exposing declarations to the rebaser.
//!
//! The scanner only finds `property: value` pairs inside blocks so their values can be rewritten;
//! it does not validate syntax. Everything it does not recognise as a declaration (selectors,
//! at-rule preludes, comments, whitespace) is kept verbatim, so serialising an untouched sheet
//! reproduces the input exactly.

use std::path::{Path, PathBuf};

use crate::declaration::Declaration;

/// A `property: value` pair found inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDeclaration {
  property: String,
  prefix: String,
  value: String,
  suffix: String,
  source_file: Option<PathBuf>,
}

impl StyleDeclaration {
  /// Property name, e.g. `background-image`.
  pub fn property(&self) -> &str {
    &self.property
  }

  fn write_to(&self, out: &mut String) {
    out.push_str(&self.prefix);
    out.push_str(&self.value);
    out.push_str(&self.suffix);
  }
}

impl Declaration for StyleDeclaration {
  fn value(&self) -> &str {
    &self.value
  }

  fn set_value(&mut self, value: String) {
    self.value = value;
  }

  fn source_file(&self) -> Option<&Path> {
    self.source_file.as_deref()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
  Raw(String),
  Declaration(StyleDeclaration),
}

/// Stylesheet text split into verbatim pieces and rewritable declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
  pieces: Vec<Piece>,
}

impl Stylesheet {
  /// Scan `css`, tagging every declaration with `source_file` as its provenance.
  pub fn parse(css: &str, source_file: Option<&Path>) -> Self {
    let mut scanner = Scanner {
      css,
      source_file,
      pieces: Vec::new(),
    };
    scanner.run();
    Self {
      pieces: scanner.pieces,
    }
  }

  /// Declarations in document order.
  pub fn declarations(&self) -> impl Iterator<Item = &StyleDeclaration> {
    self.pieces.iter().filter_map(|piece| match piece {
      Piece::Declaration(declaration) => Some(declaration),
      Piece::Raw(_) => None,
    })
  }

  /// Mutable declarations in document order.
  pub fn declarations_mut(&mut self) -> impl Iterator<Item = &mut StyleDeclaration> {
    self.pieces.iter_mut().filter_map(|piece| match piece {
      Piece::Declaration(declaration) => Some(declaration),
      Piece::Raw(_) => None,
    })
  }

  /// Serialise the stylesheet, including any rewritten values.
  pub fn to_css(&self) -> String {
    let mut out = String::new();
    for piece in &self.pieces {
      match piece {
        Piece::Raw(text) => out.push_str(text),
        Piece::Declaration(declaration) => declaration.write_to(&mut out),
      }
    }
    out
  }
}

struct Scanner<'a> {
  css: &'a str,
  source_file: Option<&'a Path>,
  pieces: Vec<Piece>,
}

impl Scanner<'_> {
  fn run(&mut self) {
    let css = self.css;
    let bytes = css.as_bytes();
    let mut segment_start = 0;
    let mut block_depth = 0usize;
    let mut paren_depth = 0usize;
    let mut last_open = 0usize;
    let mut quote: Option<u8> = None;
    let mut index = 0;

    while index < bytes.len() {
      let byte = bytes[index];

      if let Some(open) = quote {
        if byte == b'\\' {
          index += 2;
          continue;
        }
        if byte == open || byte == b'\n' {
          quote = None;
        }
        index += 1;
        continue;
      }

      if byte == b'/' && bytes.get(index + 1) == Some(&b'*') {
        index = match css[index + 2..].find("*/") {
          Some(end) => index + 2 + end + 2,
          None => bytes.len(),
        };
        continue;
      }

      // A group still open at the end of a declaration was never closed.
      if paren_depth > 0
        && block_depth > 0
        && matches!(byte, b';' | b'}')
        && !group_closes(&bytes[index..], paren_depth)
      {
        paren_depth = 0;
      }

      match byte {
        // Inside parentheses only a leading quote opens a string: `url(it's.png)` is a bare token.
        b'"' | b'\'' if paren_depth == 0 || css[last_open + 1..index].trim().is_empty() => {
          quote = Some(byte);
        }
        b'(' => {
          paren_depth += 1;
          last_open = index;
        }
        b')' => paren_depth = paren_depth.saturating_sub(1),
        b'{' if paren_depth == 0 => {
          self.raw(segment_start, index + 1);
          block_depth += 1;
          segment_start = index + 1;
        }
        b'}' if paren_depth == 0 => {
          self.segment(segment_start, index, block_depth > 0);
          self.raw(index, index + 1);
          block_depth = block_depth.saturating_sub(1);
          segment_start = index + 1;
        }
        b';' if paren_depth == 0 => {
          self.segment(segment_start, index, block_depth > 0);
          self.raw(index, index + 1);
          segment_start = index + 1;
        }
        _ => {}
      }
      index += 1;
    }

    self.raw(segment_start, bytes.len());
  }

  fn raw(&mut self, start: usize, end: usize) {
    if start >= end {
      return;
    }
    let css = self.css;
    let text = &css[start..end];
    match self.pieces.last_mut() {
      Some(Piece::Raw(existing)) => existing.push_str(text),
      _ => self.pieces.push(Piece::Raw(text.to_string())),
    }
  }

  fn segment(&mut self, start: usize, end: usize, in_block: bool) {
    let css = self.css;
    let text = &css[start..end];
    match in_block.then(|| split_declaration(text)).flatten() {
      Some((prefix_len, value_len)) => {
        let property = text[skip_trivia(text)..]
          .split(':')
          .next()
          .unwrap_or_default()
          .trim()
          .to_string();
        self.pieces.push(Piece::Declaration(StyleDeclaration {
          property,
          prefix: text[..prefix_len].to_string(),
          value: text[prefix_len..prefix_len + value_len].to_string(),
          suffix: text[prefix_len + value_len..].to_string(),
          source_file: self.source_file.map(Path::to_path_buf),
        }));
      }
      None => self.raw(start, end),
    }
  }
}

/// Whether `depth` open parentheses are closed before the enclosing block ends or a new one starts.
fn group_closes(rest: &[u8], mut depth: usize) -> bool {
  for byte in rest {
    match byte {
      b'(' => depth += 1,
      b')' => {
        depth -= 1;
        if depth == 0 {
          return true;
        }
      }
      b'{' | b'}' => return false,
      _ => {}
    }
  }
  false
}

/// Split a segment into `(prefix length, value length)`.
///
/// The prefix runs through the colon and any whitespace after it; the value stops before a
/// trailing `!important` and trailing whitespace. Returns `None` when the segment does not start
/// with a property name followed by a colon.
fn split_declaration(text: &str) -> Option<(usize, usize)> {
  let start = skip_trivia(text);
  let rest = &text[start..];
  let colon = rest.find(':')?;

  let property = rest[..colon].trim_end();
  let is_property = !property.is_empty()
    && property
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
  if !is_property {
    return None;
  }

  let after_colon = start + colon + 1;
  let after = &text[after_colon..];
  let value_start = after_colon + (after.len() - after.trim_start().len());

  let mut value = text[value_start..].trim_end();
  if let Some(bang) = value.rfind('!')
    && value[bang + 1..].trim().eq_ignore_ascii_case("important")
  {
    value = value[..bang].trim_end();
  }

  Some((value_start, value.len()))
}

/// Length of the leading whitespace and comments of `text`.
fn skip_trivia(text: &str) -> usize {
  let mut offset = 0;
  loop {
    let rest = &text[offset..];
    let trimmed = rest.trim_start();
    offset += rest.len() - trimmed.len();

    if !trimmed.starts_with("/*") {
      return offset;
    }
    match trimmed[2..].find("*/") {
      Some(end) => offset += 2 + end + 2,
      None => return text.len(),
    }
  }
}
