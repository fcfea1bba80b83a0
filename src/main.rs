use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quiz_backend::api::{self, AppState};
use quiz_backend::auth::SessionIdentity;
use quiz_backend::config::Config;
use quiz_backend::db::Database;
use quiz_backend::metrics;
use quiz_backend::quiz::QuizService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    metrics::register_metrics();

    let config = Config::load();
    let db = Database::connect(&config.database_url, config.db_max_connections)
        .await
        .context("initializing database")?;
    let db = Arc::new(db);

    let purged = db
        .delete_expired_sessions()
        .await
        .context("purging expired sessions")?;
    if purged > 0 {
        tracing::info!(purged, "removed expired sessions");
    }

    let identity = Arc::new(SessionIdentity::new(db.clone(), config.session_ttl_hours));
    let quiz = QuizService::new(db, identity.clone());

    let app = api::router(AppState::new(quiz, identity))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    tracing::info!(%addr, "quiz backend listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {e}");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("shutdown signal received");
}
