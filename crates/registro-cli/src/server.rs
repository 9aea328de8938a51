//! Wires configuration into stores, workflows and the router.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;

use registro_api::{AppState, router};
use registro_auth::{AuthConfig, AuthLayer, StaticTokenValidator};
use registro_storage::{MemoryStore, RecordStore, SqliteStore};
use registro_workflows::{MemorySessionStore, SessionStore, Workflows};

use crate::config::{RegistroConfig, StorageBackend};

/// Opens the configured record store.
pub async fn open_store(config: &RegistroConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    let storage = &config.storage;
    match storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store; records are lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Sqlite => {
            let store = SqliteStore::connect_with_options(
                &storage.database_url,
                storage.max_connections,
            )
            .await
            .with_context(|| format!("Failed to open {}", storage.database_url))?;
            tracing::info!(url = %storage.database_url, "SQLite store ready");
            Ok(Arc::new(store))
        }
    }
}

/// Session store with the configured idle timeout.
pub fn session_store(config: &RegistroConfig) -> Arc<MemorySessionStore> {
    Arc::new(MemorySessionStore::with_ttl(config.session.ttl()))
}

/// Builds the full application router over `store` and `sessions`.
pub fn build_app(
    config: &RegistroConfig,
    store: Arc<dyn RecordStore>,
    sessions: Arc<MemorySessionStore>,
) -> Router {
    let sessions: Arc<dyn SessionStore> = sessions;
    let workflows = Workflows::new(store, sessions);

    let tokens = config
        .auth
        .tokens
        .iter()
        .map(|(token, user)| (token.clone(), user.clone()))
        .collect();
    let validator = StaticTokenValidator::new(tokens);
    if config.auth.enabled && validator.is_empty() {
        tracing::warn!("Auth is enabled but no tokens are configured; inventory is unreachable");
    }
    if !config.auth.enabled {
        tracing::warn!("Auth is disabled; inventory records will not name the acting user");
    }
    let auth = AuthLayer::new(
        Arc::new(validator),
        AuthConfig {
            enabled: config.auth.enabled,
        },
    );

    router(AppState::new(workflows), auth)
}

/// Drops expired sessions every `ttl`, bounded to between one second and one
/// hour.
pub fn spawn_session_sweeper(sessions: Arc<MemorySessionStore>) -> tokio::task::JoinHandle<()> {
    let period = sessions
        .ttl()
        .clamp(Duration::from_secs(1), Duration::from_secs(60 * 60));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = sessions.purge_expired() {
                tracing::error!(error = %err, "Session sweep failed");
            }
        }
    })
}

/// `registro serve`
pub async fn serve(config: &RegistroConfig, listen: Option<String>) -> anyhow::Result<()> {
    let addr = listen.unwrap_or_else(|| config.server.listen.clone());
    let store = open_store(config).await?;
    let sessions = session_store(config);
    let sweeper = spawn_session_sweeper(Arc::clone(&sessions));
    let app = build_app(config, store, sessions);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(
        addr = %addr,
        backend = %config.storage.backend,
        auth = config.auth.enabled,
        "Registro listening"
    );
    let served = axum::serve(listener, app).await.context("Server error");
    sweeper.abort();
    served
}

/// `registro migrate`
pub async fn migrate(config: &RegistroConfig) -> anyhow::Result<()> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::info!("Memory backend has no schema to create");
        }
        StorageBackend::Sqlite => {
            // Connecting creates any missing tables
            open_store(config).await?;
            tracing::info!(url = %config.storage.database_url, "Schema is up to date");
        }
    }
    Ok(())
}
