use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::api;
use crate::state::AppState;

/// Create the plain-HTTP router: health check and the incoming-call webhook.
/// The telephony provider may deliver the webhook as either GET or POST.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(api::health_check))
        .route(
            "/incoming-calls",
            get(api::incoming_calls).post(api::incoming_calls),
        )
        .layer(TraceLayer::new_for_http())
}
