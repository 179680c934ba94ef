//! Full-text search over the served documents.
//!
//! The search subsystem is split along the single-writer / many-readers line:
//!
//! - [`store`]: the [`IndexStore`] abstraction and its SQLite implementation.
//!   Batches are committed atomically; concurrent readers never see half of
//!   a batch.
//! - [`builder`]: the [`IndexBuilder`], the only writer. It walks the document
//!   tree and re-indexes a document only when its modification time moved
//!   past the time recorded in its memo.
//! - [`query`]: the [`QueryEngine`] used by request handlers. Every term of a
//!   phrase must appear as a substring somewhere in a document for it to match.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ora_server::domain::LocalFs;
//! use ora_server::search::{IndexBuilder, QueryEngine, SqliteStore};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(SqliteStore::open(Path::new("/tmp/docs.index")).await?);
//!
//! let mut builder =
//!     IndexBuilder::new("/srv/docs", ".md", 1 << 30, Arc::new(LocalFs), store.clone());
//! let stats = builder.build_index().await?;
//! println!("indexed {} documents", stats.indexed);
//!
//! let engine = QueryEngine::new(store);
//! let hits = engine.query("alpha beta").await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod query;
pub mod store;

pub use builder::{BuildStats, IndexBuilder, IndexMemo};
pub use query::{ConjunctiveQuery, QueryEngine};
pub use store::{Batch, BatchOp, IndexEntry, IndexStore, SqliteStore};
