//! Time Tracker API
//!
//! REST service for accounts, their time trackers and a shared task list.
//! Every route under `/api/v1` except login, registration and the welcome
//! message needs a bearer token. Collection routes check the token's
//! capability bits; instance routes check that the caller owns the target.

mod auth;
mod config;
mod db;
mod error;
mod models;
mod routes;
mod state;

use crate::auth::TokenCodec;
use crate::config::Settings;
use crate::db::postgres::{create_pool, ensure_schema};
use crate::routes::create_router;
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("🚀 Starting Time Tracker API...");

    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");

    let tokens = TokenCodec::from_config(&settings.auth)?;
    let bcrypt_cost = settings.auth.bcrypt_cost;

    let state = match &settings.database {
        Some(database) => {
            let pool = create_pool(database).await?;
            ensure_schema(&pool).await?;
            Arc::new(AppState::postgres(pool, tokens, bcrypt_cost))
        }
        None => {
            warn!("⚠️  DATABASE_URL not set, using the in-memory store (data is lost on restart)");
            Arc::new(AppState::in_memory(tokens, bcrypt_cost))
        }
    };

    let app = create_router(state, &settings);

    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   GET    /health");
    info!("   GET    /api/v1");
    info!("   POST   /api/v1/register");
    info!("   POST   /api/v1/login");
    info!("   GET    /api/v1/users/{{id}}");
    info!("   GET    /api/v1/timeTrackers           (READ)");
    info!("   POST   /api/v1/timeTrackers           (CREATE)");
    info!("   GET    /api/v1/timeTrackers/{{id}}      (owner)");
    info!("   PUT    /api/v1/timeTrackers/{{id}}      (owner)");
    info!("   DELETE /api/v1/timeTrackers/{{id}}      (owner)");
    info!("   GET    /api/v1/tasks[/{{id}}]           (READ)");
    info!("   POST   /api/v1/tasks                  (CREATE)");
    info!("   PUT    /api/v1/tasks/{{id}}             (UPDATE)");
    info!("   DELETE /api/v1/tasks/{{id}}             (DELETE)");
    info!("");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging. `LOG_FORMAT=json` switches
/// to one JSON object per line.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,timetracker_api=debug,tower_http=debug"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .compact(),
            )
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
