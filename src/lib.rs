//! Telephony voice bridge.
//!
//! Bridges a telephony media stream (Twilio Media Streams over WebSocket)
//! with a realtime speech model (OpenAI Realtime API). Audio is relayed in
//! both directions as opaque base64 G.711 mu-law; the bridge tracks playback
//! timing on the telephony side and handles caller barge-in by truncating
//! the model's in-flight utterance and flushing buffered telephony audio.

pub mod config;
pub mod core;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod tools;

// Re-export commonly used items for convenience
pub use config::ServerConfig;
pub use core::*;
pub use state::AppState;
