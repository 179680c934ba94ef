//! Markdown to HTML page rendering.
//!
//! Pages are compiled on demand and never cached or persisted:
//!
//! - [`compiler`] turns raw document bytes into a complete, sanitized HTML page
//! - [`template`] holds the page and directory listing templates
//! - [`lazy`] wraps a document in a [`LazyPage`], a `Read + Seek` handle that
//!   only reads and compiles the document the first time it is read from or
//!   seeked into
//!
//! ```rust,no_run
//! use ora_server::domain::LocalFs;
//! use ora_server::page::{LazyPage, PageOptions};
//! use std::io::Read;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = PageOptions { theme: "dark".to_string() };
//! let mut page = LazyPage::open(Arc::new(LocalFs), "notes/a.md", options)?;
//!
//! // Nothing has been read yet, only stat'ed.
//! println!("last modified: {:?}", page.modified());
//!
//! let mut html = String::new();
//! page.read_to_string(&mut html)?;
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod lazy;
pub mod template;

pub use compiler::compile;
pub use lazy::{LazyPage, PageOptions};
