use crate::error::{OraError, OraResult};
use crate::search::query::ConjunctiveQuery;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::Path;

/// A document as stored in the index, keyed by its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: String,
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Upsert(IndexEntry),
    Delete(String),
}

/// A set of index changes applied as one unit.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    ops: Vec<BatchOp>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) {
        self.ops.push(BatchOp::Upsert(IndexEntry {
            id: id.into(),
            name: name.into(),
            content: content.into(),
        }));
    }

    pub fn delete(&mut self, id: impl Into<String>) {
        self.ops.push(BatchOp::Delete(id.into()));
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Persistent inverted index keyed by document id.
///
/// Implementations must apply a [`Batch`] atomically with respect to
/// concurrent [`IndexStore::search`] calls.
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Applies every operation of `batch`, or none of them.
    async fn commit(&self, batch: Batch) -> OraResult<()>;

    /// Ids of the documents matching every clause of `query`, in index order.
    async fn search(&self, query: &ConjunctiveQuery) -> OraResult<Vec<String>>;

    /// Ids of every indexed document.
    async fn document_ids(&self) -> OraResult<Vec<String>>;

    async fn get(&self, id: &str) -> OraResult<Option<IndexEntry>>;
}

/// [`IndexStore`] on top of SQLite FTS5 with the trigram tokenizer.
///
/// The database runs in WAL mode, so searches keep reading the last committed
/// state while a batch transaction is in flight.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens the index at `path`, creating the database and schema if missing.
    pub async fn open(path: &Path) -> OraResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                path TEXT UNIQUE NOT NULL,
                name TEXT NOT NULL,
                content TEXT NOT NULL DEFAULT '',
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE VIRTUAL TABLE IF NOT EXISTS contents USING fts5(name, content, content='documents', content_rowid='id', tokenize='trigram')",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TRIGGER IF NOT EXISTS documents_ai AFTER INSERT ON documents BEGIN
             INSERT INTO contents(rowid, name, content) VALUES (new.id, new.name, new.content);
            END",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TRIGGER IF NOT EXISTS documents_ad AFTER DELETE ON documents BEGIN
             INSERT INTO contents(contents, rowid, name, content) VALUES('delete', old.id, old.name, old.content);
            END",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TRIGGER IF NOT EXISTS documents_au AFTER UPDATE ON documents BEGIN
             INSERT INTO contents(contents, rowid, name, content) VALUES('delete', old.id, old.name, old.content);
             INSERT INTO contents(rowid, name, content) VALUES (new.id, new.name, new.content);
            END",
        )
        .execute(&pool)
        .await?;

        Ok(SqliteStore { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl IndexStore for SqliteStore {
    async fn commit(&self, batch: Batch) -> OraResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(OraError::IndexCommit)?;

        for op in batch.ops {
            match op {
                BatchOp::Upsert(entry) => {
                    // ON CONFLICT .. DO UPDATE fires the update trigger, REPLACE would not.
                    sqlx::query(
                        "INSERT INTO documents (path, name, content, updated_at)
                         VALUES (?, ?, ?, CURRENT_TIMESTAMP)
                         ON CONFLICT(path) DO UPDATE SET
                            name = excluded.name,
                            content = excluded.content,
                            updated_at = CURRENT_TIMESTAMP",
                    )
                    .bind(&entry.id)
                    .bind(&entry.name)
                    .bind(&entry.content)
                    .execute(&mut *tx)
                    .await
                    .map_err(OraError::IndexCommit)?;
                }
                BatchOp::Delete(id) => {
                    sqlx::query("DELETE FROM documents WHERE path = ?")
                        .bind(&id)
                        .execute(&mut *tx)
                        .await
                        .map_err(OraError::IndexCommit)?;
                }
            }
        }

        tx.commit().await.map_err(OraError::IndexCommit)?;
        Ok(())
    }

    async fn search(&self, query: &ConjunctiveQuery) -> OraResult<Vec<String>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        // Terms of three or more characters go through the trigram index;
        // shorter ones fall back to a LIKE scan over the matched rows.
        let match_expression = query.match_expression();
        let like_patterns: Vec<String> = query.like_patterns().collect();

        let mut clauses = Vec::with_capacity(like_patterns.len() + 1);
        if match_expression.is_some() {
            clauses.push("contents MATCH ?");
        }
        for _ in &like_patterns {
            clauses.push(
                r"(contents.name LIKE ? ESCAPE '\' OR contents.content LIKE ? ESCAPE '\')",
            );
        }

        let sql = format!(
            "SELECT d.path
             FROM contents
             JOIN documents d ON d.id = contents.rowid
             WHERE {}
             ORDER BY d.id",
            clauses.join(" AND ")
        );

        let mut statement = sqlx::query(&sql);
        if let Some(expression) = match_expression {
            statement = statement.bind(expression);
        }
        for pattern in like_patterns {
            statement = statement.bind(pattern.clone()).bind(pattern);
        }

        let rows = statement
            .fetch_all(&self.pool)
            .await
            .map_err(OraError::Query)?;

        Ok(rows.iter().map(|row| row.get::<String, _>(0)).collect())
    }

    async fn document_ids(&self) -> OraResult<Vec<String>> {
        let rows = sqlx::query("SELECT path FROM documents ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get::<String, _>(0)).collect())
    }

    async fn get(&self, id: &str) -> OraResult<Option<IndexEntry>> {
        let row = sqlx::query("SELECT path, name, content FROM documents WHERE path = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(IndexEntry {
                id: row.get(0),
                name: row.get(1),
                content: row.get(2),
            })),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_keeps_operations_in_order() {
        let mut batch = Batch::new();
        assert!(batch.is_empty());

        batch.upsert("a.md", "a.md", "alpha");
        batch.delete("b.md");

        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch.ops(),
            [
                BatchOp::Upsert(IndexEntry {
                    id: "a.md".into(),
                    name: "a.md".into(),
                    content: "alpha".into(),
                }),
                BatchOp::Delete("b.md".into()),
            ]
        );
    }
}
