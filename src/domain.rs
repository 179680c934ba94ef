use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tracing::warn;

/// Metadata snapshot of a document taken with a single stat call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentMeta {
    pub modified: SystemTime,
    pub size: u64,
}

/// Filesystem operations the page and index code perform on a single document.
///
/// Request handling and index building both go through this seam, so a test
/// can count or fail reads without touching the real disk layout.
pub trait DocumentSource: Send + Sync {
    /// Stats `path` without reading its content.
    fn stat(&self, path: &Path) -> io::Result<DocumentMeta>;

    /// Reads the full content of `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// [`DocumentSource`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl DocumentSource for LocalFs {
    fn stat(&self, path: &Path) -> io::Result<DocumentMeta> {
        let meta = fs::metadata(path)?;
        Ok(DocumentMeta {
            modified: meta.modified()?,
            size: meta.len(),
        })
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}

/// Bytes that cannot appear literally in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\');

/// A document found under the served root.
///
/// The filesystem stays the source of truth: this is a snapshot taken while
/// walking and its content is only read when somebody asks for it.
#[derive(Debug, Clone)]
pub struct Document {
    /// Path relative to the served root, `/`-separated, e.g. `notes/a.md`.
    pub id: String,
    /// Absolute (or root-joined) path on disk.
    pub path: PathBuf,
    pub modified: SystemTime,
    pub size: u64,
}

impl Document {
    /// The id with the document suffix removed, used as a display name.
    pub fn display_name(&self, suffix: &str) -> &str {
        self.id.strip_suffix(suffix).unwrap_or(&self.id)
    }

    /// Link path of the document as served over HTTP, each segment
    /// percent-encoded.
    pub fn link(&self) -> String {
        let mut link = String::with_capacity(self.id.len() + 1);
        for segment in self.id.split('/') {
            link.push('/');
            link.extend(utf8_percent_encode(segment, PATH_SEGMENT));
        }
        link
    }
}

/// Returns true when `path` names a document: its file name ends with
/// `suffix` and it is not a dotfile.
pub fn is_document(path: &Path, suffix: &str) -> bool {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => name.ends_with(suffix) && !name.starts_with('.'),
        None => false,
    }
}

/// Builds the `/`-separated id of `path` relative to `root`.
pub fn document_id(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?.to_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Recursively walks `root` in lexical order, calling `visit` for every
/// document whose name ends with `suffix`.
///
/// The first error, either from the filesystem or from `visit`, stops the
/// walk and is returned. Entries that vanish between listing and stat, or
/// symlinks pointing nowhere, are logged and skipped instead.
pub fn walk_documents<F>(root: &Path, suffix: &str, visit: &mut F) -> io::Result<()>
where
    F: FnMut(Document) -> io::Result<()>,
{
    walk_dir(root, root, suffix, visit)
}

fn walk_dir<F>(root: &Path, dir: &Path, suffix: &str, visit: &mut F) -> io::Result<()>
where
    F: FnMut(Document) -> io::Result<()>,
{
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();

        let Some(file_type) = present(entry.file_type(), &path)? else {
            continue;
        };
        if file_type.is_dir() {
            walk_dir(root, &path, suffix, visit)?;
            continue;
        }

        if !is_document(&path, suffix) {
            continue;
        }

        let Some(meta) = present(fs::metadata(&path), &path)? else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }

        // Non UTF-8 names cannot be served or indexed by id.
        let Some(id) = document_id(root, &path) else {
            continue;
        };

        visit(Document {
            id,
            path,
            modified: meta.modified()?,
            size: meta.len(),
        })?;
    }

    Ok(())
}

/// Turns `NotFound` for a single entry into `None`; any other error stands.
fn present<T>(result: io::Result<T>, path: &Path) -> io::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "skipping dangling or vanished entry");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_match_on_suffix_and_skip_dotfiles() {
        assert!(is_document(Path::new("notes/a.md"), ".md"));
        assert!(!is_document(Path::new("notes/.a.md"), ".md"));
        assert!(!is_document(Path::new("notes/a.txt"), ".md"));
        assert!(is_document(Path::new("a.markdown"), ".markdown"));
    }

    #[test]
    fn ids_are_slash_separated_and_relative() {
        let root = Path::new("/srv/docs");
        let path = root.join("notes").join("a.md");
        assert_eq!(document_id(root, &path).as_deref(), Some("notes/a.md"));
        assert_eq!(document_id(root, root), None);
        assert_eq!(document_id(root, Path::new("/elsewhere/a.md")), None);
    }

    #[test]
    fn display_name_drops_the_suffix() {
        let doc = Document {
            id: "notes/a.md".into(),
            path: PathBuf::from("/srv/docs/notes/a.md"),
            modified: SystemTime::UNIX_EPOCH,
            size: 0,
        };
        assert_eq!(doc.display_name(".md"), "notes/a");
        assert_eq!(doc.link(), "/notes/a.md");
    }

    #[test]
    fn links_escape_reserved_characters() {
        let doc = Document {
            id: "my notes/a#b?c 100%.md".into(),
            path: PathBuf::from("/srv/docs/my notes/a#b?c 100%.md"),
            modified: SystemTime::UNIX_EPOCH,
            size: 0,
        };
        assert_eq!(doc.link(), "/my%20notes/a%23b%3Fc%20100%25.md");
    }
}
