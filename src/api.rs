//! Read-only HTTP surface over the stats registry.

use std::net::SocketAddr;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use log::info;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::grade::Thresholds;
use crate::registry::StatsRegistry;
use crate::stats::HostStats;
use crate::view;

#[derive(Clone)]
struct ApiState {
    registry: StatsRegistry,
    thresholds: Thresholds,
}

/// Routes:
/// - `GET /` text table of all hosts
/// - `GET /api/stats` JSON array of every host's stats
/// - `GET /api/stats/{host}` JSON stats for one host, 404 if not monitored
pub fn router(registry: StatsRegistry, thresholds: Thresholds) -> Router {
    Router::new()
        .route("/", get(live_view))
        .route("/api/stats", get(all_stats))
        .route("/api/stats/{host}", get(host_stats))
        .with_state(ApiState {
            registry,
            thresholds,
        })
}

async fn all_stats(State(state): State<ApiState>) -> Json<Vec<HostStats>> {
    Json(state.registry.snapshot())
}

async fn host_stats(
    State(state): State<ApiState>,
    Path(host): Path<String>,
) -> std::result::Result<Json<HostStats>, StatusCode> {
    state.registry.get(&host).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn live_view(State(state): State<ApiState>) -> String {
    view::render_table(&state.registry.snapshot(), &state.thresholds, Utc::now())
}

pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr).await.map_err(Error::Bind)
}

/// Serves `router` until `shutdown_token` is cancelled.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown_token: CancellationToken,
) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("web interface available at http://{addr}");
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown_token.cancelled().await })
        .await
        .map_err(Error::Serve)?;

    info!("http server shutdown");
    Ok(())
}
