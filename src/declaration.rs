//! The seam between the rebaser and whatever stylesheet representation hosts it.

use std::path::Path;

/// A stylesheet declaration whose value can be rewritten in place.
///
/// The rebaser never owns declarations: it reads the value, and when at least one `url()` call
/// was processed it writes the rewritten value back.
pub trait Declaration {
  /// Current value, e.g. `url("../img/a.png") no-repeat`.
  fn value(&self) -> &str;

  /// Replace the value.
  fn set_value(&mut self, value: String);

  /// Stylesheet file that introduced the declaration, when known.
  ///
  /// References are resolved relative to this file's directory, or to the working directory when
  /// the provenance is unknown.
  fn source_file(&self) -> Option<&Path>;
}

impl<D: Declaration + ?Sized> Declaration for &mut D {
  fn value(&self) -> &str {
    (**self).value()
  }

  fn set_value(&mut self, value: String) {
    (**self).set_value(value);
  }

  fn source_file(&self) -> Option<&Path> {
    (**self).source_file()
  }
}
