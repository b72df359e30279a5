use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use css_assets_rebase::{AssetRebaser, Declaration, RebaseError, RebaseOptions};
use tempfile::tempdir;

struct TestDeclaration {
  value: String,
  source: Option<PathBuf>,
}

impl TestDeclaration {
  fn new(value: &str, source: Option<&Path>) -> Self {
    Self {
      value: value.to_string(),
      source: source.map(Path::to_path_buf),
    }
  }
}

impl Declaration for TestDeclaration {
  fn value(&self) -> &str {
    &self.value
  }

  fn set_value(&mut self, value: String) {
    self.value = value;
  }

  fn source_file(&self) -> Option<&Path> {
    self.source.as_deref()
  }
}

fn write_file(path: &Path, contents: &[u8]) {
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, contents).unwrap();
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.0.lock().unwrap().extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

/// Run `f` with log output captured, returning what was logged.
fn capture_logs(f: impl FnOnce()) -> String {
  let buffer = LogBuffer::default();
  let writer = buffer.clone();
  let subscriber = tracing_subscriber::fmt()
    .with_ansi(false)
    .with_writer(move || writer.clone())
    .finish();

  tracing::subscriber::with_default(subscriber, f);
  let bytes = buffer.0.lock().unwrap().clone();
  String::from_utf8(bytes).unwrap()
}

fn rebase_one(
  rebaser: &mut AssetRebaser,
  value: &str,
  source: &Path,
  output_file: &Path,
) -> String {
  let mut declaration = TestDeclaration::new(value, Some(source));
  rebaser
    .process_declarations([&mut declaration], Some(output_file))
    .unwrap();
  declaration.value
}

#[test]
fn relative_mode_copies_next_to_output() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write_file(&root.join("img/a.png"), b"a");

  let options = RebaseOptions::new("assets").with_relative(true);
  let mut rebaser = AssetRebaser::new(options).with_working_dir(root);
  let value = rebase_one(
    &mut rebaser,
    "url(\"../img/a.png\")",
    &root.join("src/index.css"),
    Path::new("dist/index.css"),
  );

  assert_eq!(value, "url(assets/a.png)");
  assert_eq!(fs::read(root.join("dist/assets/a.png")).unwrap(), b"a");
}

#[test]
fn absolute_mode_anchors_assets_to_working_dir() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write_file(&root.join("img/a.png"), b"a");

  let options = RebaseOptions::new("dist/assets");
  let mut rebaser = AssetRebaser::new(options).with_working_dir(root);
  let value = rebase_one(
    &mut rebaser,
    "url(\"../img/a.png\")",
    &root.join("src/index.css"),
    Path::new("dist/css/index.css"),
  );

  assert_eq!(value, "url(../assets/a.png)");
  assert!(root.join("dist/assets/a.png").exists());
}

#[test]
fn keeps_query_and_fragment() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write_file(&root.join("src/icon.svg"), b"<svg/>");

  let options = RebaseOptions::new("assets").with_relative(true);
  let mut rebaser = AssetRebaser::new(options).with_working_dir(root);
  let value = rebase_one(
    &mut rebaser,
    "url(icon.svg?v=2#frag)",
    &root.join("src/index.css"),
    Path::new("dist/index.css"),
  );

  assert_eq!(value, "url(assets/icon.svg?v=2#frag)");
}

#[test]
fn leaves_remote_references_alone() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  let options = RebaseOptions::new("assets").with_relative(true);
  let mut rebaser = AssetRebaser::new(options).with_working_dir(root);

  for value in [
    "url(data:image/png;base64,AAA==)",
    "url('data:image/svg+xml;utf8,<svg>(x)</svg>')",
    "url(#gradient)",
    "url(\"https://cdn.example.com/logo.png\")",
  ] {
    let rebased = rebase_one(
      &mut rebaser,
      value,
      &root.join("src/index.css"),
      Path::new("dist/index.css"),
    );
    assert_eq!(rebased, value);
  }

  assert!(!root.join("dist").exists());
}

#[test]
fn rewrites_every_call_in_a_value() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write_file(&root.join("src/a.png"), b"a");
  write_file(&root.join("src/b.png"), b"b");

  let options = RebaseOptions::new("assets").with_relative(true);
  let mut rebaser = AssetRebaser::new(options).with_working_dir(root);
  let value = rebase_one(
    &mut rebaser,
    "url(a.png) top left, url(#mask), url( 'b.png' ) bottom",
    &root.join("src/index.css"),
    Path::new("dist/index.css"),
  );

  assert_eq!(
    value,
    "url(assets/a.png) top left, url(#mask), url(assets/b.png) bottom"
  );
}

#[test]
fn missing_asset_is_left_untouched() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write_file(&root.join("src/present.png"), b"p");

  let options = RebaseOptions::new("assets").with_relative(true);
  let mut rebaser = AssetRebaser::new(options).with_working_dir(root);
  let mut declaration = TestDeclaration::new(
    "url('missing.png'), url(present.png)",
    Some(&root.join("src/index.css")),
  );
  let mut summary = Default::default();
  let logs = capture_logs(|| {
    summary = rebaser
      .process_declarations([&mut declaration], Some(Path::new("dist/index.css")))
      .unwrap();
  });

  assert!(logs.contains("WARN"));
  assert!(logs.contains(&format!(
    "can't read file '{}', ignoring",
    root.join("src/missing.png").display()
  )));
  assert_eq!(declaration.value, "url('missing.png'), url(assets/present.png)");
  assert_eq!(summary.missing, 1);
  assert_eq!(summary.rebased, 1);
}

#[test]
fn missing_assets_path_disables_rebasing() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write_file(&root.join("src/a.png"), b"a");

  let mut rebaser = AssetRebaser::new(RebaseOptions::default()).with_working_dir(root);
  assert_eq!(rebaser.options().assets_path(), None);
  let mut declaration = TestDeclaration::new("url(a.png)", Some(&root.join("src/index.css")));
  let mut summary = Default::default();
  let logs = capture_logs(|| {
    summary = rebaser
      .process_declarations([&mut declaration], Some(Path::new("dist/index.css")))
      .unwrap();
    rebaser
      .process_declarations([&mut declaration], Some(Path::new("dist/index.css")))
      .unwrap();
  });

  assert!(!summary.enabled);
  assert_eq!(logs.matches("no assets path provided, aborting").count(), 1);
  assert_eq!(declaration.value, "url(a.png)");
  assert!(!root.join("dist").exists());

  rebaser.reset();
  let logs = capture_logs(|| {
    rebaser
      .process_declarations([&mut declaration], Some(Path::new("dist/index.css")))
      .unwrap();
  });
  assert_eq!(logs.matches("no assets path provided, aborting").count(), 1);
}

#[test]
fn colliding_names_are_suffixed_and_stable() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write_file(&root.join("a/logo.png"), b"a");
  write_file(&root.join("b/logo.png"), b"b");

  let options = RebaseOptions::new("assets")
    .with_relative(true)
    .with_rename_duplicates(true);
  let mut rebaser = AssetRebaser::new(options).with_working_dir(root);
  let output = Path::new("dist/index.css");

  let mut first = String::new();
  let mut second = String::new();
  let logs = capture_logs(|| {
    first = rebase_one(&mut rebaser, "url(logo.png)", &root.join("a/a.css"), output);
    second = rebase_one(&mut rebaser, "url(logo.png)", &root.join("b/b.css"), output);
  });
  let again = rebase_one(&mut rebaser, "url(logo.png)", &root.join("a/a.css"), output);

  assert_eq!(
    logs.matches(&format!(
      "duplicated path '{}' renamed to: assets/logo_1.png",
      root.join("b/logo.png").display()
    ))
    .count(),
    1
  );
  assert_eq!(first, "url(assets/logo.png)");
  assert_eq!(second, "url(assets/logo_1.png)");
  assert_eq!(again, first);
  assert_eq!(fs::read(root.join("dist/assets/logo.png")).unwrap(), b"a");
  assert_eq!(fs::read(root.join("dist/assets/logo_1.png")).unwrap(), b"b");
  assert_eq!(rebaser.registry().len(), 2);

  let targets: Vec<(PathBuf, PathBuf)> = rebaser
    .registry()
    .records()
    .map(|record| (record.source.clone(), record.target.relative.clone()))
    .collect();
  assert_eq!(targets, vec![
    (root.join("a/logo.png"), PathBuf::from("assets/logo.png")),
    (root.join("b/logo.png"), PathBuf::from("assets/logo_1.png")),
  ]);
}

#[test]
fn without_renaming_first_copy_wins() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write_file(&root.join("a/logo.png"), b"a");
  write_file(&root.join("b/logo.png"), b"b");

  let options = RebaseOptions::new("assets").with_relative(true);
  let mut rebaser = AssetRebaser::new(options).with_working_dir(root);
  let output = Path::new("dist/index.css");

  let first = rebase_one(&mut rebaser, "url(logo.png)", &root.join("a/a.css"), output);
  let second = rebase_one(&mut rebaser, "url(logo.png)", &root.join("b/b.css"), output);

  assert_eq!(first, second);
  assert_eq!(fs::read(root.join("dist/assets/logo.png")).unwrap(), b"a");
  assert!(rebaser.registry().is_empty());
}

#[test]
fn reset_starts_a_fresh_registry() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write_file(&root.join("a/logo.png"), b"a");

  let options = RebaseOptions::new("assets")
    .with_relative(true)
    .with_rename_duplicates(true);
  let mut rebaser = AssetRebaser::new(options).with_working_dir(root);
  rebase_one(
    &mut rebaser,
    "url(logo.png)",
    &root.join("a/a.css"),
    Path::new("dist/index.css"),
  );
  assert_eq!(rebaser.registry().len(), 1);

  rebaser.reset();
  assert!(rebaser.registry().is_empty());
}

#[test]
fn unclosed_call_fails_without_touching_value() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  let options = RebaseOptions::new("assets");
  let mut rebaser = AssetRebaser::new(options).with_working_dir(root);

  let mut declaration = TestDeclaration::new("url(a.png", Some(&root.join("index.css")));
  let err = rebaser
    .process_declarations([&mut declaration], None)
    .unwrap_err();

  assert!(matches!(err, RebaseError::UnclosedCall { .. }));
  assert_eq!(declaration.value, "url(a.png");
}

#[test]
fn empty_call_is_an_error() {
  let dir = tempdir().unwrap();
  let options = RebaseOptions::new("assets");
  let mut rebaser = AssetRebaser::new(options).with_working_dir(dir.path());

  let mut declaration = TestDeclaration::new("url( )", None);
  let err = rebaser
    .process_declarations([&mut declaration], None)
    .unwrap_err();

  assert!(matches!(err, RebaseError::EmptyToken { .. }));
}

#[test]
fn unknown_provenance_resolves_from_working_dir() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write_file(&root.join("a.png"), b"a");

  let options = RebaseOptions::new("assets");
  let mut rebaser = AssetRebaser::new(options).with_working_dir(root);
  let mut declaration = TestDeclaration::new("url(a.png)", None);
  rebaser
    .process_declarations([&mut declaration], None)
    .unwrap();

  assert_eq!(declaration.value, "url(assets/a.png)");
  assert!(root.join("assets/a.png").exists());
}
