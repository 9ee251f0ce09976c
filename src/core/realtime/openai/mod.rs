//! OpenAI Realtime API session for one telephony call.

pub mod client;
pub mod config;
pub mod messages;

pub use client::{ModelSession, SessionCore};
pub use config::{
    AudioFormat, DEFAULT_CONFIGURE_DELAY, DEFAULT_TEMPERATURE, GREETING_PROMPT,
    ModelSessionSettings, OPENAI_REALTIME_URL, RealtimeModel, RealtimeVoice, SYSTEM_INSTRUCTIONS,
};
pub use messages::{ClientEvent, ServerEvent};
