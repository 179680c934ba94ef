#![allow(dead_code)]

use ora_server::domain::{DocumentMeta, DocumentSource, LocalFs};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

/// Local filesystem that counts how often documents are stat'ed and read.
#[derive(Debug, Default)]
pub struct CountingFs {
    stats: AtomicUsize,
    reads: AtomicUsize,
}

impl CountingFs {
    pub fn stats(&self) -> usize {
        self.stats.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl DocumentSource for CountingFs {
    fn stat(&self, path: &Path) -> io::Result<DocumentMeta> {
        self.stats.fetch_add(1, Ordering::SeqCst);
        LocalFs.stat(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        LocalFs.read(path)
    }
}

/// Writes `content` to `root/id`, creating parent directories.
pub fn write_doc(root: &Path, id: &str, content: &str) -> io::Result<PathBuf> {
    let path = root.join(id);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content)?;
    Ok(path)
}

/// Sets the modification time of `path` explicitly, so tests never depend on
/// the filesystem's timestamp resolution.
pub fn set_modified(path: &Path, modified: SystemTime) -> io::Result<()> {
    File::options().write(true).open(path)?.set_modified(modified)
}

/// A fixed point in time, whole seconds so it survives HTTP dates.
pub fn epoch_plus(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}
