//! Serves the Taskly web application.
//!
//! Settings come from `TASKLY_*` environment variables (see
//! [`taskly::config`]). When `TASKLY_DATABASE_URL` is unset, tasks live in
//! memory and vanish on exit.

use diesel::{
    pg::PgConnection,
    r2d2::{ConnectionManager, Pool},
};
use std::sync::Arc;
use taskly::{
    config::{AppConfig, ConfigError},
    task::{
        adapters::{
            memory::InMemoryTaskRepository,
            postgres::{PostgresTaskRepository, TaskPgPool},
        },
        ports::{TaskRepository, TaskRepositoryError},
    },
    telemetry,
    web::{self, AppState, WebError},
};
use thiserror::Error;
use tokio::{net::TcpListener, runtime::Builder};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that stop the server from starting or keep it from running.
#[derive(Debug, Error)]
enum ServeError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] std::io::Error),
    #[error("failed to build database pool: {0}")]
    Pool(#[source] diesel::r2d2::PoolError),
    #[error("failed to prepare database schema: {0}")]
    Schema(#[source] TaskRepositoryError),
    #[error("failed to build application state: {0}")]
    State(#[source] WebError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

fn main() -> Result<(), BoxError> {
    let config = AppConfig::from_env().map_err(ServeError::from)?;
    telemetry::init(&config.log_filter);

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(ServeError::RuntimeInit)?;
    runtime.block_on(run(config)).map_err(Into::into)
}

async fn run(config: AppConfig) -> Result<(), ServeError> {
    if let Some(url) = config.database_url.as_deref() {
        let pool = build_pool(url, config.pool_size)?;
        let repository =
            PostgresTaskRepository::new(pool).with_slug_policy(config.slug_policy);
        repository
            .apply_schema()
            .await
            .map_err(ServeError::Schema)?;
        tracing::info!(pool_size = config.pool_size, "using PostgreSQL task storage");
        serve(repository, &config).await
    } else {
        tracing::warn!("TASKLY_DATABASE_URL is unset; tasks are kept in memory only");
        let repository = InMemoryTaskRepository::new().with_slug_policy(config.slug_policy);
        serve(repository, &config).await
    }
}

fn build_pool(url: &str, pool_size: u32) -> Result<TaskPgPool, ServeError> {
    let manager = ConnectionManager::<PgConnection>::new(url);
    Pool::builder()
        .max_size(pool_size)
        .build(manager)
        .map_err(ServeError::Pool)
}

async fn serve<R>(repository: R, config: &AppConfig) -> Result<(), ServeError>
where
    R: TaskRepository + 'static,
{
    let state = AppState::new(Arc::new(repository), config).map_err(ServeError::State)?;
    let app = web::router(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: config.bind_addr,
            source,
        })?;
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServeError::Serve)
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
