//! # ora_server
//!
//! Serves a directory tree of Markdown documents over HTTP, compiling each one
//! to HTML on demand, with full-text search over the whole tree.
//!
//! ## Features
//!
//! - **Lazy pages**: a document is only read and compiled when a response
//!   actually needs its body; `If-Modified-Since` hits never touch the file
//! - **Conditional and range requests**: 304, 412, 206 and 416 handled per page
//! - **Sanitized output**: rendered HTML goes through an allow-list sanitizer
//! - **Incremental indexing**: periodic rebuilds only re-read documents whose
//!   modification time moved since they were last indexed
//! - **Substring search**: every term of a phrase must appear somewhere in a
//!   document, backed by SQLite FTS5 with the trigram tokenizer
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ora_server::config::ServerConfig;
//! use ora_server::domain::LocalFs;
//! use ora_server::scheduler::RebuildScheduler;
//! use ora_server::search::{IndexBuilder, QueryEngine, SqliteStore};
//! use ora_server::server::{AppState, create_router};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::default();
//! let store = Arc::new(SqliteStore::open(&config.index_path).await?);
//!
//! // Rebuild the index in the background
//! let builder = IndexBuilder::new(
//!     &config.root,
//!     config.suffix.clone(),
//!     config.max_index_file_size,
//!     Arc::new(LocalFs),
//!     store.clone(),
//! );
//! let mut scheduler = RebuildScheduler::new(builder, config.rebuild_interval);
//! scheduler.run()?;
//!
//! // Serve documents and search
//! let app = create_router(AppState {
//!     root: config.root.clone(),
//!     theme: config.theme.clone(),
//!     suffix: config.suffix.clone(),
//!     source: Arc::new(LocalFs),
//!     search: QueryEngine::new(store),
//!     request_timeout: config.request_timeout,
//! });
//! let listener = tokio::net::TcpListener::bind(config.addr.as_str()).await?;
//! axum::serve(listener, app).await?;
//!
//! scheduler.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **[`domain`]**: documents, the filesystem seam and the tree walk
//! - **[`page`]**: markdown compilation, templates and lazy page handles
//! - **[`search`]**: the index store, the incremental builder and queries
//! - **[`scheduler`]**: the background rebuild loop
//! - **[`server`]**: routes, conditional serving and the directory listing
//! - **[`config`]**: the plain values everything is constructed from
//! - **[`error`]**: the error type shared by all of the above
//!
//! Request handlers and the rebuild loop never wait on each other. The only
//! state they share is the index store, which commits batches atomically, and
//! the document tree on disk, which both only read.
//!
//! ## Error Handling
//!
//! All fallible operations return [`OraResult<T>`] with the unified [`OraError`].
//! [`OraError::status`] maps each error to the status code reported to clients;
//! details stay in the log.

pub mod config;
pub mod domain;
pub mod error;
pub mod page;
pub mod scheduler;
pub mod search;
pub mod server;

/// Re-exports the most commonly used types for convenience.
pub use error::{OraError, OraResult};
