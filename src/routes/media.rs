use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::media_stream;
use crate::state::AppState;

/// Create the WebSocket router for the telephony media stream.
pub fn create_media_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/media-stream", get(media_stream::media_stream_handler))
        .layer(TraceLayer::new_for_http())
}
