//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check and incoming-call webhook
//! - `media_stream` - Telephony media-stream WebSocket

pub mod api;
pub mod media_stream;

// Re-export commonly used handlers for convenient access
pub use media_stream::media_stream_handler;
