//! Server configuration.
//!
//! Configuration comes from environment variables (a `.env` file is loaded
//! in `main` before this runs). It is constructed once at startup and passed
//! explicitly through `AppState`; nothing reads the environment after boot.
//!
//! Recognized variables:
//! - `HOST` (default `0.0.0.0`)
//! - `PORT` (default `3000`)
//! - `OPENAI_API_KEY`
//! - `BIOGRAPHY_URL`
//! - `REALTIME_MODEL` (default `gpt-4o-mini-realtime-preview`)
//! - `REALTIME_VOICE` (default `verse`)
//! - `SESSION_CONFIG_DELAY_MS` (default `1000`)

use std::time::Duration;

use crate::core::realtime::openai::{
    DEFAULT_CONFIGURE_DELAY, ModelSessionSettings, RealtimeModel, RealtimeVoice,
};

/// Default bind host.
const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
const DEFAULT_PORT: u16 = 3000;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// API key for the realtime endpoint.
    pub openai_api_key: Option<String>,
    /// Endpoint serving the biography document.
    pub biography_url: Option<String>,
    /// Realtime model for call sessions.
    pub realtime_model: RealtimeModel,
    /// Voice for assistant audio.
    pub realtime_voice: RealtimeVoice,
    /// Delay before the session-configuration handshake.
    pub session_config_delay: Duration,
}

/// Zeroize secret fields when the config is dropped so keys do not linger
/// in freed memory.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.openai_api_key {
            key.zeroize();
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            openai_api_key: None,
            biography_url: None,
            realtime_model: RealtimeModel::default(),
            realtime_voice: RealtimeVoice::default(),
            session_config_delay: DEFAULT_CONFIGURE_DELAY,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let host = std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match std::env::var("PORT") {
            Ok(v) => v.parse::<u16>().map_err(|e| format!("Invalid PORT: {e}"))?,
            Err(_) => DEFAULT_PORT,
        };

        let session_config_delay = match std::env::var("SESSION_CONFIG_DELAY_MS") {
            Ok(v) => {
                let ms = v
                    .parse::<u64>()
                    .map_err(|e| format!("Invalid SESSION_CONFIG_DELAY_MS: {e}"))?;
                Duration::from_millis(ms)
            }
            Err(_) => DEFAULT_CONFIGURE_DELAY,
        };

        Ok(Self {
            host,
            port,
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            biography_url: std::env::var("BIOGRAPHY_URL").ok(),
            realtime_model: std::env::var("REALTIME_MODEL")
                .map(|v| RealtimeModel::from_str_or_default(&v))
                .unwrap_or_default(),
            realtime_voice: std::env::var("REALTIME_VOICE")
                .map(|v| RealtimeVoice::from_str_or_default(&v))
                .unwrap_or_default(),
            session_config_delay,
        })
    }

    /// Socket address string for binding.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build per-call model session settings from this configuration.
    pub fn session_settings(&self) -> ModelSessionSettings {
        ModelSessionSettings {
            api_key: self.openai_api_key.clone().unwrap_or_default(),
            model: self.realtime_model,
            voice: self.realtime_voice,
            configure_delay: self.session_config_delay,
            ..ModelSessionSettings::default()
        }
    }
}
