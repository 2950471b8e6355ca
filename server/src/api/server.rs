use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::direct::{self, DirectState};
use super::proxy::{self, ProxyState};
use super::{cors_layer, health_check, not_found};
use crate::cache::JsonFile;
use crate::config::{ApiConfig, ProxyConfig};
use crate::mirror::GithubMirror;

/// Routes of the caching proxy that mirrors scores remotely.
pub fn proxy_router(state: ProxyState) -> Router {
    Router::new()
        .route("/api/health", get(health_check).fallback(not_found))
        .route("/api/scores", get(proxy::list_scores).fallback(not_found))
        .route("/api/save-score", post(proxy::save_score).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Routes of the direct read/write API over a local document.
pub fn direct_router(state: DirectState) -> Router {
    Router::new()
        .route("/api/health", get(health_check).fallback(not_found))
        .route(
            "/api/leaderboard",
            get(direct::leaderboard)
                .post(direct::save_score)
                .fallback(not_found),
        )
        .route("/api/leaderboard/top10", get(direct::top_ten).fallback(not_found))
        .route("/api/leaderboard/stats", get(direct::stats).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

pub async fn run_proxy_server(config: ProxyConfig) -> Result<()> {
    let mirror = GithubMirror::new(config.mirror.clone())?;
    let state = ProxyState {
        cache: JsonFile::new(&config.cache_file),
        mirror: Arc::new(mirror),
    };

    info!(
        cache = %config.cache_file.display(),
        "Mirroring scores to {}/{}:{}",
        config.mirror.owner,
        config.mirror.repo,
        config.mirror.path
    );
    info!("POST  /api/save-score   -> save a score and mirror it");
    info!("GET   /api/scores       -> all cached scores");

    serve(&config.bind_addr, proxy_router(state), "Proxy server").await
}

pub async fn run_api_server(config: ApiConfig) -> Result<()> {
    let state = DirectState {
        db: JsonFile::new(&config.db_file),
    };

    info!(db = %config.db_file.display(), "Serving leaderboard document");
    info!("GET  /api/leaderboard       -> top 50 scores");
    info!("GET  /api/leaderboard/top10 -> top 10 scores");
    info!("POST /api/leaderboard       -> save a score");
    info!("GET  /api/leaderboard/stats -> global stats");

    serve(&config.bind_addr, direct_router(state), "Leaderboard API server").await
}

async fn serve(addr: &str, app: Router, name: &str) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("{} listening on http://{}", name, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("{} error: {}", name, e))?;

    info!("{} shut down", name);
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received shutdown signal. Shutting down gracefully...");
    }
}
