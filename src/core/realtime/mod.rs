//! Realtime speech-model sessions.
//!
//! One `ModelSession` exists per connected call, speaking the OpenAI
//! Realtime API over a dedicated WebSocket.

mod base;
pub mod openai;

pub use base::{RealtimeError, RealtimeResult};
pub use openai::{ModelSession, ModelSessionSettings, RealtimeModel, RealtimeVoice, SessionCore};
