use crate::domain::DocumentSource;
use crate::error::{OraError, OraResult};
use crate::page::compiler::compile;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Rendering options applied when a page is compiled.
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub theme: String,
}

enum State {
    Pending,
    Materialized(Cursor<Vec<u8>>),
}

/// A `Read + Seek` handle over a document's compiled page.
///
/// Opening a page only stats the document. The document is read and compiled
/// the first time [`Read::read`] or [`Seek::seek`] is called; later calls reuse
/// the compiled bytes, which never change for the lifetime of the handle. A
/// conditional request that ends in "not modified" therefore never reads or
/// compiles anything.
///
/// One handle serves exactly one request.
pub struct LazyPage {
    source: Arc<dyn DocumentSource>,
    path: PathBuf,
    options: PageOptions,
    modified: SystemTime,
    state: State,
}

impl LazyPage {
    /// Stats `path` and returns a handle that has not read anything yet.
    ///
    /// Returns [`OraError::NotFound`] if the document does not exist and
    /// [`OraError::Io`] for any other stat failure.
    pub fn open(
        source: Arc<dyn DocumentSource>,
        path: impl Into<PathBuf>,
        options: PageOptions,
    ) -> OraResult<Self> {
        let path = path.into();
        let meta = source.stat(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => OraError::NotFound(path.display().to_string()),
            _ => OraError::Io(e),
        })?;

        Ok(Self {
            source,
            path,
            options,
            modified: meta.modified,
            state: State::Pending,
        })
    }

    /// Modification time taken when the handle was opened.
    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_materialized(&self) -> bool {
        matches!(self.state, State::Materialized(_))
    }

    /// Reads and compiles the document unless that already happened.
    ///
    /// A document that vanished since `open` or fails to compile surfaces
    /// here as an I/O error.
    fn materialize(&mut self) -> io::Result<&mut Cursor<Vec<u8>>> {
        if let State::Pending = self.state {
            let raw = self.source.read(&self.path)?;
            let title = self
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let html = compile(&title, &self.options.theme, &raw).map_err(io::Error::other)?;
            self.state = State::Materialized(Cursor::new(html));
        }

        match &mut self.state {
            State::Materialized(cursor) => Ok(cursor),
            State::Pending => Err(io::Error::other("page was not materialized")),
        }
    }
}

impl Read for LazyPage {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.materialize()?.read(buf)
    }
}

impl Seek for LazyPage {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.materialize()?.seek(pos)
    }
}
