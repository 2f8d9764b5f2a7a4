//! personal_finance - expense tracking API
//!
//! Records a user's expenses, keyed by API key, and normalizes amounts
//! between Brazilian display text and integer cents.

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use personal_finance::api::{build_router, AppState};
use personal_finance::config::{LogFormat, StorageBackend};
use personal_finance::handlers::{IssueApiKeyCommand, IssueApiKeyHandler};
use personal_finance::repository::{MemoryStore, PgStore};
use personal_finance::{db, Config};

/// Initialize tracing/logging
fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "personal_finance=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres backend"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await?;

    db::verify_connection(&pool).await?;
    if !db::check_schema(&pool).await? {
        tracing::error!("Database schema is not complete. Please run migrations.");
        return Err(anyhow::anyhow!("Database schema incomplete"));
    }

    tracing::info!("Database connected successfully");
    Ok(pool)
}

/// Issue a key at startup so a fresh memory-backed server is usable
async fn bootstrap_key(store: &MemoryStore, email: &str) -> anyhow::Result<()> {
    let issued = IssueApiKeyHandler::new(Arc::new(store.clone()))
        .execute(IssueApiKeyCommand::new(email))
        .await?;

    tracing::info!(user_mail = %issued.user_mail, key_id = %issued.key_id, "Bootstrap API key issued");
    println!("API key for {}: {}", issued.user_mail, issued.api_key);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!(
        environment = %config.environment,
        backend = ?config.storage_backend,
        "Starting personal_finance server"
    );

    let (state, pool) = match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = connect(&config).await?;
            (AppState::postgres(PgStore::new(pool.clone())), Some(pool))
        }
        StorageBackend::Memory => {
            if config.is_production() {
                tracing::warn!("Memory backend in production: data is lost on restart");
            }
            let store = MemoryStore::new();
            if let Some(email) = config.bootstrap_email.as_deref() {
                bootstrap_key(&store, email).await?;
            }
            (AppState::memory(store), None)
        }
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup
    tracing::info!("Server shutting down...");
    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Database connections closed");
    }
    tracing::info!("Goodbye!");

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
