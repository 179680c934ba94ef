use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ora_server::config::{
    DEFAULT_MAX_INDEX_FILE_SIZE, DEFAULT_REBUILD_INTERVAL, DEFAULT_REQUEST_TIMEOUT, ServerConfig,
    default_index_path,
};
use ora_server::domain::LocalFs;
use ora_server::scheduler::RebuildScheduler;
use ora_server::search::{IndexBuilder, QueryEngine, SqliteStore};
use ora_server::server::{AppState, create_router};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ora-server")]
#[command(
    about = "Serves a directory of markdown files as HTML with full-text search",
    long_about = None
)]
struct Cli {
    /// Default log level when RUST_LOG is not set
    #[arg(long, global = true, env = "ORA_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Shorthand for --log-level debug
    #[arg(long, global = true, env = "ORA_DEBUG")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Launches a webserver that displays markdown files
    Server(ServerArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum Theme {
    Dark,
    Light,
}

impl Theme {
    fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

#[derive(Args)]
struct ServerArgs {
    /// <host>:<port> the webserver listens on
    #[arg(env = "ORA_ADDR", default_value = "localhost:8080")]
    addr: String,

    /// Directory of markdown files
    #[arg(short = 'd', long = "directory", env = "ORA_DIR", default_value = ".")]
    dir: PathBuf,

    /// CSS theme
    #[arg(short, long, env = "ORA_THEME", value_enum, default_value = "dark")]
    theme: Theme,

    /// Seconds between search index rebuilds
    #[arg(
        long,
        env = "ORA_REBUILD_INTERVAL_SECS",
        default_value_t = DEFAULT_REBUILD_INTERVAL.as_secs()
    )]
    rebuild_interval_secs: u64,

    /// Documents larger than this many bytes are not indexed
    #[arg(long, env = "ORA_MAX_INDEX_FILE_SIZE", default_value_t = DEFAULT_MAX_INDEX_FILE_SIZE)]
    max_index_file_size: u64,

    /// Suffix of the files served as documents
    #[arg(long, env = "ORA_SUFFIX", default_value = ".md")]
    suffix: String,

    /// Where the search index is stored (default: ~/.ora-server.index)
    #[arg(long, env = "ORA_INDEX_PATH")]
    index_path: Option<PathBuf>,

    /// Seconds a single request may take
    #[arg(
        long,
        env = "ORA_REQUEST_TIMEOUT_SECS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs()
    )]
    request_timeout_secs: u64,
}

impl From<ServerArgs> for ServerConfig {
    fn from(args: ServerArgs) -> Self {
        ServerConfig {
            root: args.dir,
            addr: args.addr,
            theme: args.theme.as_str().to_string(),
            rebuild_interval: Duration::from_secs(args.rebuild_interval_secs.max(1)),
            max_index_file_size: args.max_index_file_size,
            suffix: args.suffix,
            index_path: args.index_path.unwrap_or_else(default_index_path),
            request_timeout: Duration::from_secs(args.request_timeout_secs.max(1)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { cli.log_level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    match cli.command {
        Command::Server(args) => run_server(args.into()).await,
    }
}

async fn run_server(config: ServerConfig) -> Result<()> {
    info!("Starting ora-server v{}", env!("CARGO_PKG_VERSION"));
    info!("  Directory: {}", config.root.display());
    info!("  Theme: {}", config.theme);
    info!("  Index: {}", config.index_path.display());

    let store = Arc::new(
        SqliteStore::open(&config.index_path)
            .await
            .with_context(|| format!("could not open index at {}", config.index_path.display()))?,
    );
    let source = Arc::new(LocalFs);

    let builder = IndexBuilder::new(
        config.root.clone(),
        config.suffix.clone(),
        config.max_index_file_size,
        source.clone(),
        store.clone(),
    );
    let mut scheduler = RebuildScheduler::new(builder, config.rebuild_interval);
    scheduler.run()?;

    let app = create_router(AppState {
        root: config.root.clone(),
        theme: config.theme.clone(),
        suffix: config.suffix.clone(),
        source,
        search: QueryEngine::new(store.clone()),
        request_timeout: config.request_timeout,
    });

    let listener = tokio::net::TcpListener::bind(config.addr.as_str())
        .await
        .with_context(|| format!("could not bind {}", config.addr))?;
    info!("Listening on http://{}", config.addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("could not listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Received shutdown signal, gracefully shutting down");
        })
        .await;

    scheduler.shutdown().await?;
    store.close().await;

    served.context("server exited")
}
