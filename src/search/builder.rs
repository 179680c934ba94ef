use crate::domain::{DocumentSource, walk_documents};
use crate::error::{OraError, OraResult};
use crate::search::store::{Batch, IndexStore};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, info};

/// Last indexed modification time per document id.
///
/// Owned by the [`IndexBuilder`] and only touched from the indexing task.
#[derive(Debug, Clone, Default)]
pub struct IndexMemo {
    indexed: HashMap<String, SystemTime>,
}

impl IndexMemo {
    /// A document is current when its modification time has not moved past
    /// the time it was last indexed at.
    pub fn is_current(&self, id: &str, modified: SystemTime) -> bool {
        self.indexed
            .get(id)
            .is_some_and(|indexed| *indexed >= modified)
    }

    pub fn get(&self, id: &str) -> Option<SystemTime> {
        self.indexed.get(id).copied()
    }

    pub fn record(&mut self, id: impl Into<String>, modified: SystemTime) {
        self.indexed.insert(id.into(), modified);
    }

    pub fn forget(&mut self, id: &str) {
        self.indexed.remove(id);
    }

    pub fn len(&self) -> usize {
        self.indexed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexed.is_empty()
    }

    fn ids(&self) -> impl Iterator<Item = &String> {
        self.indexed.keys()
    }
}

/// Summary of one build cycle. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub indexed: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub oversized: usize,
    pub elapsed: Duration,
}

impl BuildStats {
    pub fn average_per_document(&self) -> Duration {
        match u32::try_from(self.indexed) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => self.elapsed / n,
        }
    }
}

/// What one walk of the tree produced, before anything is committed.
#[derive(Default)]
struct Scan {
    batch: Batch,
    staged: Vec<(String, SystemTime)>,
    seen: HashSet<String>,
    unchanged: usize,
    oversized: usize,
}

/// Incrementally indexes the document tree into an [`IndexStore`].
///
/// A document is re-read and re-submitted if and only if its modification
/// time advanced since its last successful index. Every build ends with a
/// single atomic batch commit that also removes documents that disappeared
/// from disk.
pub struct IndexBuilder {
    root: PathBuf,
    suffix: String,
    max_file_size: u64,
    source: Arc<dyn DocumentSource>,
    store: Arc<dyn IndexStore>,
    memo: IndexMemo,
}

impl IndexBuilder {
    pub fn new(
        root: impl Into<PathBuf>,
        suffix: impl Into<String>,
        max_file_size: u64,
        source: Arc<dyn DocumentSource>,
        store: Arc<dyn IndexStore>,
    ) -> Self {
        Self {
            root: root.into(),
            suffix: suffix.into(),
            max_file_size,
            source,
            store,
            memo: IndexMemo::default(),
        }
    }

    pub fn memo(&self) -> &IndexMemo {
        &self.memo
    }

    /// Walks the tree and commits every new or modified document.
    ///
    /// A filesystem error during the walk aborts the build with
    /// [`OraError::IndexWalk`] before anything is committed; a failed commit
    /// returns [`OraError::IndexCommit`]. Either way the memo is left as it
    /// was, so the affected documents are picked up again next time.
    pub async fn build_index(&mut self) -> OraResult<BuildStats> {
        let started = Instant::now();

        let root = self.root.clone();
        let suffix = self.suffix.clone();
        let max_file_size = self.max_file_size;
        let source = self.source.clone();
        let memo = std::mem::take(&mut self.memo);

        let (memo, scan) = tokio::task::spawn_blocking(move || {
            let scan = scan_tree(&root, &suffix, max_file_size, source.as_ref(), &memo);
            (memo, scan)
        })
        .await
        .map_err(|e| OraError::Other(format!("index walk panicked: {e}")))?;
        self.memo = memo;

        let mut scan = scan.map_err(OraError::IndexWalk)?;

        let mut stale: HashSet<String> = self
            .store
            .document_ids()
            .await?
            .into_iter()
            .filter(|id| !scan.seen.contains(id))
            .collect();
        stale.extend(
            self.memo
                .ids()
                .filter(|id| !scan.seen.contains(*id))
                .cloned(),
        );
        for id in &stale {
            scan.batch.delete(id.as_str());
        }

        self.store.commit(scan.batch).await?;

        let indexed = scan.staged.len();
        for (id, modified) in scan.staged {
            self.memo.record(id, modified);
        }
        for id in &stale {
            self.memo.forget(id);
        }

        let stats = BuildStats {
            indexed,
            removed: stale.len(),
            unchanged: scan.unchanged,
            oversized: scan.oversized,
            elapsed: started.elapsed(),
        };

        info!(
            "Indexed {} documents, removed {}, in {:.2}s (average {:.2}ms/doc)",
            stats.indexed,
            stats.removed,
            stats.elapsed.as_secs_f64(),
            stats.average_per_document().as_secs_f64() * 1000.0
        );

        Ok(stats)
    }
}

fn scan_tree(
    root: &std::path::Path,
    suffix: &str,
    max_file_size: u64,
    source: &dyn DocumentSource,
    memo: &IndexMemo,
) -> std::io::Result<Scan> {
    let mut scan = Scan::default();

    walk_documents(root, suffix, &mut |doc| {
        scan.seen.insert(doc.id.clone());

        if memo.is_current(&doc.id, doc.modified) {
            debug!(document = %doc.id, reason = "unchanged", "skipping document");
            scan.unchanged += 1;
            return Ok(());
        }

        if doc.size > max_file_size {
            debug!(
                document = %doc.id,
                size = doc.size,
                reason = "oversized",
                "skipping document"
            );
            scan.oversized += 1;
            return Ok(());
        }

        let content = source.read(&doc.path)?;
        scan.batch.upsert(
            doc.id.as_str(),
            doc.id.as_str(),
            String::from_utf8_lossy(&content).into_owned(),
        );
        scan.staged.push((doc.id, doc.modified));
        Ok(())
    })?;

    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memo_skips_only_when_not_newer() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let mut memo = IndexMemo::default();
        assert!(!memo.is_current("a.md", t0));

        memo.record("a.md", t0);
        assert!(memo.is_current("a.md", t0));
        assert!(memo.is_current("a.md", t0 - Duration::from_secs(1)));
        assert!(!memo.is_current("a.md", t0 + Duration::from_nanos(1)));

        memo.forget("a.md");
        assert!(memo.is_empty());
    }

    #[test]
    fn average_is_zero_without_documents() {
        let stats = BuildStats {
            elapsed: Duration::from_secs(2),
            ..Default::default()
        };
        assert_eq!(stats.average_per_document(), Duration::ZERO);

        let stats = BuildStats {
            indexed: 4,
            elapsed: Duration::from_secs(2),
            ..Default::default()
        };
        assert_eq!(stats.average_per_document(), Duration::from_millis(500));
    }
}
