//! Snippetbox - HTTP server for the snippet sharing site.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use snippetbox_web::session::SqliteSessionStore;
use snippetbox_web::{AppState, Config, router};

/// Snippetbox - paste and share short text snippets.
#[derive(Parser, Debug)]
#[command(name = "snippetbox-web")]
#[command(about = "Server-rendered snippet sharing site", long_about = None)]
struct Args {
    /// Path to .env file (optional).
    #[arg(long, env = "DOTENV_PATH", default_value = ".env")]
    dotenv: String,

    /// HTTP network address (overrides SNIPPETBOX_ADDR).
    #[arg(long)]
    addr: Option<String>,

    /// SQLite database file (overrides SNIPPETBOX_DB_PATH).
    #[arg(long)]
    db: Option<PathBuf>,

    /// Verbose logging.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load .env file if it exists
    if std::path::Path::new(&args.dotenv).exists() {
        dotenvy::from_path(&args.dotenv)?;
        eprintln!("Loaded environment from {}", args.dotenv);
    }

    // Load configuration, CLI flags win
    let mut config = Config::from_env()?;
    if let Some(addr) = args.addr {
        config.bind_addr = addr;
    }
    if let Some(db) = args.db {
        config.db_path = db;
    }
    config.debug |= args.debug;

    // Initialize tracing
    let default_filter = if config.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        bind_addr = %config.bind_addr,
        db_path = %config.db_path.display(),
        debug = config.debug,
        request_timeout = ?config.request_timeout,
        "configuration loaded"
    );

    // Open the database and build state
    let db = snippetbox_core::open_db(&config.db_path)?;
    let sessions = SqliteSessionStore::new(db.clone());
    let sweep_interval = config.session_sweep_interval;
    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config, db);

    tokio::spawn(sweep_expired_sessions(sessions, sweep_interval));

    let app = router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "starting server (plain HTTP; terminate TLS upstream)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("received Ctrl+C, shutting down"),
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("received terminate signal, shutting down");
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

/// Periodically delete expired session rows.
async fn sweep_expired_sessions(store: SqliteSessionStore, period: std::time::Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        match store.delete_expired() {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed, "expired sessions deleted"),
            Err(err) => tracing::warn!(error = %err, "failed to delete expired sessions"),
        }
    }
}
