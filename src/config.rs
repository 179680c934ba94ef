use std::path::PathBuf;
use std::time::Duration;

/// Name of the index file placed under the user's home directory.
pub const INDEX_FILE_NAME: &str = ".ora-server.index";

/// Documents larger than this are never read into the index (1 GiB).
pub const DEFAULT_MAX_INDEX_FILE_SIZE: u64 = 1 << 30;

pub const DEFAULT_REBUILD_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Values the server is constructed from.
///
/// Nothing in the library reads the environment; the binary fills this in
/// from its command line and hands it over as plain values.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory tree of documents being served.
    pub root: PathBuf,
    /// `<host>:<port>` the HTTP listener binds to.
    pub addr: String,
    /// Stylesheet name, `dark` or `light`.
    pub theme: String,
    pub rebuild_interval: Duration,
    pub max_index_file_size: u64,
    /// File suffix that marks a document, including the dot.
    pub suffix: String,
    /// Location of the persisted search index.
    pub index_path: PathBuf,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            addr: "localhost:8080".to_string(),
            theme: "dark".to_string(),
            rebuild_interval: DEFAULT_REBUILD_INTERVAL,
            max_index_file_size: DEFAULT_MAX_INDEX_FILE_SIZE,
            suffix: ".md".to_string(),
            index_path: default_index_path(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Resolves `~/.ora-server.index`, falling back to the working directory when
/// no home directory is known.
pub fn default_index_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(INDEX_FILE_NAME)
}
