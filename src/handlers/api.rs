//! Plain HTTP handlers: health check and the incoming-call webhook.

use axum::Json;
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;
use serde_json::json;

/// Health check endpoint.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Incoming-call webhook.
///
/// Answers the telephony provider with a TwiML document that speaks a short
/// notice and connects the call's media stream to this server's WebSocket
/// endpoint. The stream URL is derived from the request `Host` header so the
/// document works behind any public hostname.
pub async fn incoming_calls(headers: HeaderMap) -> impl IntoResponse {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    let twiml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Response>
    <Say>Connecting to A.I. assistant.</Say>
    <Connect>
        <Stream url="wss://{host}/media-stream" />
    </Connect>
</Response>"#
    );

    ([(header::CONTENT_TYPE, "text/xml")], twiml)
}
