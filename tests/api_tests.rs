use std::net::{Ipv4Addr, SocketAddr};

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use net_monitor::{HostStats, ProbeOutcome, StatsRegistry, Thresholds, api};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

fn test_registry() -> StatsRegistry {
    let registry = StatsRegistry::new(["8.8.8.8", "down.example", "fresh.example"]);
    let up = registry.tracker("8.8.8.8").unwrap();
    up.apply(ProbeOutcome::success(30.0));
    up.apply(ProbeOutcome::Failure);
    up.apply(ProbeOutcome::success(50.0));
    registry.tracker("down.example").unwrap().apply(ProbeOutcome::Failure);
    registry
}

async fn get(uri: &str) -> (StatusCode, Vec<u8>) {
    let app = api::router(test_registry(), Thresholds::default());
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn stats_endpoint_lists_all_hosts() {
    let (status, body) = get("/api/stats").await;
    assert_eq!(status, StatusCode::OK);

    let stats: Vec<HostStats> = serde_json::from_slice(&body).unwrap();
    assert_eq!(stats.len(), 3);

    let up = stats.iter().find(|s| s.host == "8.8.8.8").unwrap();
    assert_eq!(up.packets_sent, 3);
    assert_eq!(up.packets_received, 2);
    assert_eq!(up.avg_latency, 40.0);

    let raw: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let fresh = raw
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["host"] == "fresh.example")
        .unwrap();
    assert_eq!(fresh["status"], "unknown");
    assert_eq!(fresh["avgLatency"], 0.0);
    assert!(fresh["minLatency"].is_null());
    assert!(fresh["maxLatency"].is_null());
    assert!(fresh["lastSeen"].is_null());
    assert_eq!(fresh["packetLoss"], 0.0);
}

#[tokio::test]
async fn single_host_lookup() {
    let (status, body) = get("/api/stats/down.example").await;
    assert_eq!(status, StatusCode::OK);
    let stats: HostStats = serde_json::from_slice(&body).unwrap();
    assert_eq!(stats.packet_loss_percent, 100.0);

    let (status, _) = get("/api/stats/not-monitored.example").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn root_serves_text_view() {
    let (status, body) = get("/").await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.starts_with("HOST"));
    assert!(text.contains("down.example"));
    assert!(text.contains("Never"));
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let (status, _) = get("/favicon.ico").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn serve_stops_on_cancel() {
    let listener = api::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
        .await
        .unwrap();
    let token = CancellationToken::new();
    let handle = tokio::spawn(api::serve(
        listener,
        api::router(test_registry(), Thresholds::default()),
        token.clone(),
    ));

    token.cancel();
    handle.await.unwrap().unwrap();
}
