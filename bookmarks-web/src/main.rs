//! bookmarks-web - Smart Bookmarks server
//!
//! Serves the landing page, the signed-in dashboard, and the sign-in round trip
//! from a single SQLite database under the root folder.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bookmarks_common::config::{
    locate_config_file, CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use bookmarks_common::db::init_database;
use bookmarks_common::session::SqliteSessionProvider;
use bookmarks_common::store::SqliteBookmarkStore;
use bookmarks_web::{build_router, purge_expired_sessions, AppState, SessionWorkspaces, WebSettings};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Interval between sweeps of expired sessions and sign-in codes
const PURGE_INTERVAL: Duration = Duration::from_secs(3600);

/// Command-line arguments for bookmarks-web
#[derive(Parser, Debug)]
#[command(name = "bookmarks-web")]
#[command(about = "Smart Bookmarks web server")]
#[command(version)]
struct Args {
    /// Folder holding the database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:5780
    #[arg(short, long, env = "BOOKMARKS_BIND")]
    bind: Option<String>,

    /// Path to config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long, env = "BOOKMARKS_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let defaults = CompiledDefaults::for_current_platform();
    let config_path = locate_config_file(args.config.as_deref());

    // Peek at the configured level; the config is loaded for real once logging is up
    let log_level = args
        .log_level
        .clone()
        .or_else(|| {
            config_path
                .as_deref()
                .and_then(|p| TomlConfig::load(p).ok())
                .map(|c| c.logging.level)
        })
        .unwrap_or_else(|| defaults.log_level.clone());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any database work
    info!(
        "Starting Smart Bookmarks (bookmarks-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = TomlConfig::load_or_default(config_path.as_deref());

    let root_folder = RootFolderResolver::new()
        .with_cli_arg(args.root_folder.clone())
        .with_toml(&config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let bind_address = args
        .bind
        .clone()
        .or_else(|| config.bind_address.clone())
        .unwrap_or_else(|| defaults.bind_address.clone());

    let settings = WebSettings::from_config(&config, &bind_address);
    let identity = &config.identity;

    let session_ttl =
        chrono::Duration::from_std(settings.session_ttl).context("Session TTL out of range")?;
    let provider = Arc::new(
        SqliteSessionProvider::new(pool.clone(), settings.absolute_url(&identity.authorize_url))
            .with_session_ttl(session_ttl),
    );

    let store = Arc::new(SqliteBookmarkStore::new(pool));
    let mut state = AppState::new(store, provider.clone(), settings.clone());

    if identity.authorize_url.starts_with('/') {
        info!("Built-in sign-in enabled at {}", settings.absolute_url(&identity.authorize_url));
        state = state.with_dev_login(provider.clone());
    } else {
        info!("Sign-in delegated to {}", identity.authorize_url);
    }

    tokio::spawn(purge_loop(provider, state.workspaces.clone()));

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;
    info!("bookmarks-web listening on http://{}", bind_address);
    info!("Public URL: {}", settings.public_url);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Periodically drop expired sessions, unused sign-in codes, and their cached collections
async fn purge_loop(provider: Arc<SqliteSessionProvider>, workspaces: SessionWorkspaces) {
    let mut interval = tokio::time::interval(PURGE_INTERVAL);
    loop {
        interval.tick().await;
        match purge_expired_sessions(&provider, &workspaces).await {
            Ok((0, 0)) => {}
            Ok((purged, evicted)) => info!(
                "Purged {} expired sessions and codes, evicted {} cached collections",
                purged, evicted
            ),
            Err(e) => warn!("Session purge failed: {}", e),
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
