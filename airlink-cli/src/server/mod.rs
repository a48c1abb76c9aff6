//! JSON HTTP server

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, post},
};
use log::info;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{AirtableApi, AirtableClient};
use crate::config::Config;
use crate::session::SessionStore;

/// Shared by every request
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn AirtableApi>,
    pub pool: SqlitePool,
    pub sessions: Arc<SessionStore>,
    pub lookup_resolution_tries: u32,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        .route(
            "/api/v1/fetchInitialLinkedRecords",
            post(routes::fetch_initial_linked_records),
        )
        .route(
            "/api/v1/fetchRecordsForLinkedRecordsSelector",
            post(routes::fetch_records_for_linked_records_selector),
        )
        .route("/api/v1/sessions/:session_id", get(routes::get_session))
        .route(
            "/api/v1/sessions/:session_id/actions",
            post(routes::post_session_action),
        )
        .route(
            "/api/v1/linkedRecordPrimaryValues",
            get(routes::get_primary_values),
        )
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn serve(config: &Config, bind: &str) -> Result<()> {
    let settings = &config.settings;
    let api = AirtableClient::from_settings(settings)?;
    let sessions = Arc::new(SessionStore::new(Duration::from_secs(
        settings.server.session_idle_timeout_secs,
    )));
    let eviction = sessions
        .clone()
        .spawn_eviction_task(Duration::from_secs(settings.server.eviction_interval_secs.max(1)));

    let state = AppState {
        api: Arc::new(api),
        pool: config.pool().clone(),
        sessions,
        lookup_resolution_tries: settings.airtable.lookup_resolution_tries,
    };

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Listening on {}", listener.local_addr()?);

    let result = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error");

    eviction.abort();
    info!("Server stopped");
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}
