use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use folio_core::portfolio::entity::{Side, TrackingMode};
use folio_core::portfolio::error::FeedError;
use folio_core::portfolio::port::SnapshotProvider;
use folio_core::settings::entity::FeedSettings;
use folio_feed::http::HttpSnapshotProvider;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::TcpListener;

async fn portfolio(
    Path(user): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if user != "alice" {
        return (StatusCode::OK, Json(json!({"success": false, "error": "User not found"})));
    }
    let auth = headers.get("authorization").and_then(|v| v.to_str().ok());
    if auth != Some("Basic YWxpY2U6c2VjcmV0") {
        return (StatusCode::UNAUTHORIZED, Json(json!({"success": false, "error": "bad auth"})));
    }
    match params.get("portfolio_name").map(String::as_str) {
        Some("Main") => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "portfolio": [
                    {"symbol": "BTCUSDT", "quantity": 1.0, "entry_price": 100.0, "current_price": 94.0,
                     "pnl": -6.0, "pnl_percent": -6.0, "position_side": "LONG"},
                    {"symbol": "ETHUSDT", "quantity": 2.0, "entry_price": 100.0, "current_price": 90.0,
                     "pnl": 20.0, "pnl_percent": 10.0, "side": "sell"}
                ],
                "summary": {"total_investment": 300.0, "total_current_value": 294.0}
            })),
        ),
        Some("Exit") => (StatusCode::OK, Json(json!({"success": true}))),
        _ => (StatusCode::NOT_FOUND, Json(json!({"success": false, "error": "no portfolio"}))),
    }
}

async fn spawn_server() -> anyhow::Result<String> {
    let app = Router::new().route("/api/device/portfolio/{user}", get(portfolio));
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = format!("http://127.0.0.1:{}", listener.local_addr()?.port());
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    Ok(addr)
}

fn settings(server: &str, username: &str, exit: &str) -> FeedSettings {
    FeedSettings {
        server: format!("{server}/"),
        username: username.to_string(),
        password: "secret".to_string(),
        entry_portfolio: "Main".to_string(),
        exit_portfolio: exit.to_string(),
    }
}

fn provider(feed: FeedSettings) -> HttpSnapshotProvider {
    rustls::crypto::ring::default_provider().install_default().ok();
    HttpSnapshotProvider::new(feed, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_entry_portfolio() -> anyhow::Result<()> {
    let server = spawn_server().await?;
    let feed = provider(settings(&server, "alice", "Exit"));

    let snap = feed.fetch(TrackingMode::Entry, true).await?;
    assert_eq!(snap.len(), 2);
    assert_eq!(snap.positions()[0].symbol, "BTCUSDT");
    assert_eq!(snap.positions()[0].side, Side::Long);
    assert_eq!(snap.positions()[1].side, Side::Short);
    assert_eq!(snap.summary().total_investment, 300.0);
    assert!((snap.summary().total_pnl_percent + 2.0).abs() < 1e-9);
    Ok(())
}

#[tokio::test]
async fn test_body_without_portfolio_is_unavailable() -> anyhow::Result<()> {
    let server = spawn_server().await?;
    let feed = provider(settings(&server, "alice", "Exit"));
    let err = feed.fetch(TrackingMode::Exit, true).await.unwrap_err();
    assert!(matches!(err, FeedError::Parse(_)));
    Ok(())
}

#[tokio::test]
async fn test_non_ok_status() -> anyhow::Result<()> {
    let server = spawn_server().await?;
    let feed = provider(settings(&server, "alice", "Missing"));
    let err = feed.fetch(TrackingMode::Exit, true).await.unwrap_err();
    assert!(matches!(err, FeedError::Status(404)));

    let mut wrong = settings(&server, "alice", "Exit");
    wrong.password = "nope".to_string();
    let err = provider(wrong).fetch(TrackingMode::Entry, true).await.unwrap_err();
    assert!(matches!(err, FeedError::Status(401)));
    Ok(())
}

#[tokio::test]
async fn test_platform_error() -> anyhow::Result<()> {
    let server = spawn_server().await?;
    let feed = provider(settings(&server, "bob", "Exit"));
    let err = feed.fetch(TrackingMode::Entry, true).await.unwrap_err();
    assert!(matches!(err, FeedError::Platform(ref m) if m == "User not found"));
    Ok(())
}

#[tokio::test]
async fn test_offline_and_unconfigured_skip_network() {
    let feed = provider(settings("http://127.0.0.1:9", "alice", "Exit"));
    assert!(matches!(
        feed.fetch(TrackingMode::Entry, false).await,
        Err(FeedError::Offline)
    ));

    let feed = provider(FeedSettings::default());
    assert!(matches!(
        feed.fetch(TrackingMode::Entry, true).await,
        Err(FeedError::NotConfigured)
    ));
}

#[tokio::test]
async fn test_unreachable_server() {
    let feed = provider(settings("http://127.0.0.1:9", "alice", "Exit"));
    let err = feed.fetch(TrackingMode::Entry, true).await.unwrap_err();
    assert!(matches!(err, FeedError::Network(_) | FeedError::Timeout));
}
