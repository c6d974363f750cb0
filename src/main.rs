//! DevHub - Developer network REST backend
//! Mission: Register developers, authenticate them, and serve their profiles

use anyhow::{Context, Result};
use clap::Parser;
use devhub_backend::{build_router, db::Database, AppState, Config};
use dotenv::dotenv;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "devhub")]
#[command(about = "Developer network REST backend")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long, env = "BIND_ADDR")]
    bind: Option<String>,

    /// Path to the SQLite database
    #[arg(short, long, env = "DB_PATH")]
    db_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    let _ = dotenv();
    init_tracing();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(db_path) = cli.db_path {
        config.db_path = db_path;
    }

    info!("🚀 DevHub backend starting");

    let db = Database::open(&config.db_path)?;
    let state = AppState::from_config(&config, db)?;

    info!(
        "🔐 Authentication initialized (token TTL {}s)",
        config.token_ttl.as_secs()
    );

    let app = build_router(state);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("👋 Server stopped");
    Ok(())
}

/// Initialize tracing with env-filter support
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devhub_backend=debug,devhub=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("🛑 Shutdown signal received");
}
