//! Commentary service entry point.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `commentary-config.yaml` (optional) and env
//! 2. Initialize structured logging (tracing)
//! 3. Connect to `PostgreSQL` and apply migrations, or fall back to the
//!    in-memory store when no database URL is configured
//! 4. Build the shared state with the broadcast notifier
//! 5. Serve HTTP until `Ctrl-C`

mod config;
mod error;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use commentary_api::{
    AppState, CommentaryHub, CommentaryRepository, MemoryRepository, ServerConfig,
};
use commentary_db::PostgresPool;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig, ServiceConfig};
use crate::error::StartupError;

/// Default configuration file, resolved against the working directory.
const CONFIG_FILE: &str = "commentary-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, database bootstrap, or the server
/// fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let config = load_config().context("loading configuration")?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        host = %config.server.host,
        port = config.server.port,
        broadcast = config.broadcast.enabled,
        database = config.database.url.is_some(),
        "commentary-server starting"
    );

    // 3. Persistence.
    let (repository, pool) = connect_store(&config)
        .await
        .context("initializing commentary store")?;

    // 4. Shared state.
    let mut state = AppState::with_hub(repository, CommentaryHub::new(config.broadcast.capacity));
    if !config.broadcast.enabled {
        info!("Live commentary broadcast disabled");
        state = state.without_notifier();
    }

    // 5. Serve.
    let server_config = ServerConfig::from(&config.server);
    let served = commentary_api::start_server(&server_config, Arc::new(state))
        .await
        .map_err(StartupError::from);

    if let Some(pool) = pool {
        pool.close().await;
    }

    served.context("serving commentary API")?;
    info!("commentary-server shutdown complete");
    Ok(())
}

/// Read the config file if it exists, otherwise defaults plus env.
fn load_config() -> Result<ServiceConfig, StartupError> {
    let path = Path::new(CONFIG_FILE);
    let config = if path.exists() {
        ServiceConfig::from_file(path)?
    } else {
        ServiceConfig::from_env()?
    };
    Ok(config)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Pick the repository: `PostgreSQL` when a URL is configured, memory otherwise.
///
/// Returns the pool too so it can be closed on shutdown.
async fn connect_store(
    config: &ServiceConfig,
) -> Result<(Arc<dyn CommentaryRepository>, Option<PostgresPool>), StartupError> {
    let Some(pg_config) = config.database.postgres() else {
        warn!("No database URL configured, commentary is kept in memory only");
        let repository: Arc<dyn CommentaryRepository> = Arc::new(MemoryRepository::new());
        return Ok((repository, None));
    };

    let pool = PostgresPool::connect(&pg_config).await?;
    if config.database.run_migrations {
        pool.run_migrations().await?;
    }

    let repository: Arc<dyn CommentaryRepository> = Arc::new(pool.commentary());
    Ok((repository, Some(pool)))
}
