//! HTTP server initialization and runtime setup.
//!
//! Handles storage selection, cache setup, and the Axum server lifecycle.

use crate::config::{CodeStrategy, Config, StorageBackend};
use crate::domain::repositories::{LinkRepository, TokenRepository};
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::memory::{MemoryLinkRepository, MemoryTokenRepository};
use crate::infrastructure::persistence::{PgLinkRepository, PgTokenRepository};
use crate::routes::app_router;
use crate::state::{AppState, StateParts};
use crate::utils::code_generator::{CodeGenerator, RandomCodeGenerator, SequentialCodeGenerator};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{info, warn};

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - The mapping store (PostgreSQL with migrations, or in-memory)
/// - Redis cache (or NullCache fallback)
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (link_repository, token_repository) = build_repositories(&config).await?;
    let cache = build_cache(&config).await;

    let state = AppState::new(StateParts {
        link_repository,
        token_repository,
        cache,
        generator: build_generator(&config),
        max_attempts: config.allocation_max_attempts,
        signing_secret: config.token_signing_secret.clone(),
        public_base_url: config.public_base_url.clone(),
    });

    if let Some(raw_token) = &config.memory_api_token {
        if config.storage_backend == StorageBackend::Memory {
            let token = state
                .auth_service
                .issue_token("bootstrap", raw_token)
                .await
                .context("Failed to register MEMORY_API_TOKEN")?;
            info!(token_id = token.id, "Registered bootstrap API token");
        } else {
            warn!("MEMORY_API_TOKEN is ignored with the postgres backend");
        }
    }

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Opens a PostgreSQL pool, retrying with exponential backoff.
///
/// Attempts are capped by `DB_CONNECT_RETRIES`.
pub async fn connect_database(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is not configured")?;

    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    let strategy = ExponentialBackoff::from_millis(2)
        .factor(250)
        .max_delay(Duration::from_secs(10))
        .map(jitter)
        .take(config.db_connect_retries.saturating_sub(1));

    let pool = Retry::spawn(strategy, || {
        let options = options.clone();
        async move {
            options.connect(database_url).await.inspect_err(|e| {
                warn!(error = %e, "Database connection attempt failed");
            })
        }
    })
    .await
    .context("Failed to connect to database")?;

    info!("Connected to database");
    Ok(pool)
}

/// Builds the link and token stores for the configured backend.
async fn build_repositories(
    config: &Config,
) -> Result<(Arc<dyn LinkRepository>, Arc<dyn TokenRepository>)> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = connect_database(config).await?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            info!("Migrations applied");

            let pool = Arc::new(pool);
            Ok((
                Arc::new(PgLinkRepository::new(pool.clone())),
                Arc::new(PgTokenRepository::new(pool)),
            ))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage, all links are lost on restart");
            Ok((
                Arc::new(MemoryLinkRepository::new()),
                Arc::new(MemoryTokenRepository::new()),
            ))
        }
    }
}

/// Connects Redis when configured, falling back to [`NullCache`].
pub async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
        Ok(redis) => {
            info!(ttl = config.cache_ttl_seconds, "Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

/// Builds the short code generator selected by `CODE_STRATEGY`.
pub fn build_generator(config: &Config) -> Arc<dyn CodeGenerator> {
    match config.code_strategy {
        CodeStrategy::Random => Arc::new(RandomCodeGenerator::new(config.code_length)),
        CodeStrategy::Sequential => Arc::new(SequentialCodeGenerator::new(
            config.code_sequence_start,
            config.code_length,
        )),
    }
}

/// Resolves when Ctrl+C or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
