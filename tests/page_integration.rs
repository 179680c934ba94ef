mod common;

use common::{CountingFs, write_doc};
use ora_server::OraError;
use ora_server::page::{LazyPage, PageOptions, compile};
use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;
use tempfile::TempDir;

fn dark() -> PageOptions {
    PageOptions {
        theme: "dark".to_string(),
    }
}

#[test]
fn compile_is_deterministic() -> Result<(), OraError> {
    let raw = b"# Title\n\nSome *text* with a [link](https://example.com).\n\n| a | b |\n|---|---|\n| 1 | 2 |\n";

    let first = compile("a.md", "dark", raw)?;
    let second = compile("a.md", "dark", raw)?;
    assert_eq!(first, second);

    let html = String::from_utf8(first).unwrap();
    assert!(html.contains("<title>a.md</title>"));
    assert!(html.contains(r#"href="/css/dark.css""#));
    assert!(html.contains(r#"<h1 id="title">Title</h1>"#));
    assert!(html.contains("<em>text</em>"));
    assert!(html.contains("<table>"));

    Ok(())
}

#[test]
fn compile_strips_scripts_but_keeps_code_classes() -> Result<(), OraError> {
    let raw = b"Hello\n\n<script>alert('x')</script>\n\n<a href=\"javascript:alert(1)\">bad</a>\n\n```rust\nfn main() {}\n```\n";

    let html = String::from_utf8(compile("a.md", "light", raw)?).unwrap();
    let (_, body) = html.split_once("<article>").unwrap();
    assert!(!body.contains("<script"));
    assert!(!html.contains("alert('x')"));
    assert!(!html.contains("javascript:"));
    assert!(html.contains(r#"<code class="language-rust">"#));
    assert!(html.contains(r#"href="/css/light.css""#));

    Ok(())
}

#[test]
fn compile_rejects_unknown_theme_names() {
    let result = compile("a.md", "../evil", b"# hi");
    assert!(matches!(result, Err(OraError::Compilation(_))));
}

#[test]
fn compile_accepts_invalid_utf8() -> Result<(), OraError> {
    let html = String::from_utf8(compile("a.md", "dark", b"caf\xe9 au lait")?).unwrap();
    assert!(html.contains("au lait"));
    Ok(())
}

#[test]
fn open_only_stats() -> Result<(), OraError> {
    let tmpdir = TempDir::new().unwrap();
    let path = write_doc(tmpdir.path(), "a.md", "# Alpha\n")?;
    let fs = Arc::new(CountingFs::default());

    let page = LazyPage::open(fs.clone(), &path, dark())?;

    assert_eq!(fs.stats(), 1);
    assert_eq!(fs.reads(), 0);
    assert!(!page.is_materialized());
    assert_eq!(page.path(), path.as_path());

    Ok(())
}

#[test]
fn first_read_materializes_exactly_once() -> Result<(), OraError> {
    let tmpdir = TempDir::new().unwrap();
    let path = write_doc(tmpdir.path(), "a.md", "# Alpha\n\nhello\n")?;
    let fs = Arc::new(CountingFs::default());

    let mut page = LazyPage::open(fs.clone(), &path, dark())?;

    let len = page.seek(SeekFrom::End(0))?;
    assert_eq!(fs.reads(), 1);
    assert!(page.is_materialized());

    page.seek(SeekFrom::Start(0))?;
    let mut html = Vec::new();
    page.read_to_end(&mut html)?;
    assert_eq!(html.len() as u64, len);

    // Re-reading serves the same bytes without touching the file again.
    page.seek(SeekFrom::Start(0))?;
    let mut again = Vec::new();
    page.read_to_end(&mut again)?;
    assert_eq!(html, again);
    assert_eq!(fs.reads(), 1);

    assert_eq!(html, compile("a.md", "dark", b"# Alpha\n\nhello\n")?);

    Ok(())
}

#[test]
fn open_missing_document_is_not_found() {
    let tmpdir = TempDir::new().unwrap();
    let fs = Arc::new(CountingFs::default());

    let result = LazyPage::open(fs.clone(), tmpdir.path().join("missing.md"), dark());

    assert!(matches!(result, Err(OraError::NotFound(_))));
    assert_eq!(fs.reads(), 0);
}

#[test]
fn document_vanishing_after_open_fails_the_first_read() -> Result<(), OraError> {
    let tmpdir = TempDir::new().unwrap();
    let path = write_doc(tmpdir.path(), "a.md", "# Alpha\n")?;
    let fs = Arc::new(CountingFs::default());

    let mut page = LazyPage::open(fs.clone(), &path, dark())?;
    std::fs::remove_file(&path)?;

    let mut buf = [0u8; 16];
    let err = page.read(&mut buf).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    assert!(!page.is_materialized());

    Ok(())
}

#[test]
fn bad_theme_surfaces_on_first_read() -> Result<(), OraError> {
    let tmpdir = TempDir::new().unwrap();
    let path = write_doc(tmpdir.path(), "a.md", "# Alpha\n")?;
    let options = PageOptions {
        theme: "no such theme".to_string(),
    };

    let mut page = LazyPage::open(Arc::new(CountingFs::default()), &path, options)?;

    assert!(page.seek(SeekFrom::End(0)).is_err());

    Ok(())
}
