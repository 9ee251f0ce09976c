//! Server Startup Tests
//!
//! Verify the HTTP surface boots and answers with the expected documents.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use tower::util::ServiceExt;

use callbridge::{ServerConfig, routes, state::AppState};

fn test_app() -> Router {
    let mut config = ServerConfig::default();
    config.host = "127.0.0.1".to_string();
    config.port = 0;
    let app_state = Arc::new(AppState::new(config));

    Router::new()
        .merge(routes::api::create_api_router())
        .merge(routes::media::create_media_router())
        .with_state(app_state)
}

#[tokio::test]
async fn test_health_check_responds() {
    let app = test_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "callbridge");
}

#[tokio::test]
async fn test_incoming_calls_returns_twiml() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/incoming-calls")
                .header(header::HOST, "bridge.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/xml"
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.starts_with("<?xml"));
    assert!(body.contains(r#"<Stream url="wss://bridge.example.com/media-stream" />"#));
}

#[tokio::test]
async fn test_incoming_calls_accepts_get() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/incoming-calls")
                .header(header::HOST, "localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_media_stream_requires_upgrade() {
    let app = test_app();

    // A plain GET without upgrade headers must not be treated as a WebSocket
    let response = app
        .oneshot(
            Request::builder()
                .uri("/media-stream")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_ne!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
