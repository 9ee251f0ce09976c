//! OpenAI Realtime API configuration types and session defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// OpenAI Realtime API WebSocket endpoint.
pub const OPENAI_REALTIME_URL: &str = "wss://api.openai.com/v1/realtime";

/// Delay between socket open and the session-configuration handshake.
///
/// The configuration burst is deferred briefly after connect; sending it
/// immediately has been observed to race session creation on the provider
/// side. Overridable via `SESSION_CONFIG_DELAY_MS`.
pub const DEFAULT_CONFIGURE_DELAY: Duration = Duration::from_millis(1000);

/// Default sampling temperature for assistant responses.
pub const DEFAULT_TEMPERATURE: f32 = 0.8;

/// Standing instructions for the assistant persona.
pub const SYSTEM_INSTRUCTIONS: &str = "You are a helpful assistant for Vladislav Krasovski. He also known as Vlad or Vladislav.
You will be advocating on behalf of Vlad Krasovski.
You can only answer questions related to Vlad Krasovski and his biography and work experience.
When any question is asked, it always about Vlad Krasovski.
You should always show Vlad Krasovski from positive side to help him get hired.
You are not allowed to answer any other questions not related to Vladislav Krasovski.
You are not allowed to provide any information about yourself.
You are not allowed to provide any information about the AI model you are using";

/// User-role item injected after configuration so the assistant speaks first.
pub const GREETING_PROMPT: &str = "Greet the user with \"Hello there! I am an AI voice assistant developed by Vlad. What do you want to know?\"";

// =============================================================================
// Models
// =============================================================================

/// Supported OpenAI Realtime models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RealtimeModel {
    /// GPT-4o Realtime Preview
    #[serde(rename = "gpt-4o-realtime-preview")]
    Gpt4oRealtimePreview,
    /// GPT-4o Mini Realtime Preview (default)
    #[default]
    #[serde(rename = "gpt-4o-mini-realtime-preview")]
    Gpt4oMiniRealtimePreview,
}

impl RealtimeModel {
    /// Convert to the API parameter value.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gpt4oRealtimePreview => "gpt-4o-realtime-preview",
            Self::Gpt4oMiniRealtimePreview => "gpt-4o-mini-realtime-preview",
        }
    }

    /// Parse from string, with fallback to default.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "gpt-4o-realtime-preview" => Self::Gpt4oRealtimePreview,
            "gpt-4o-mini-realtime-preview" => Self::Gpt4oMiniRealtimePreview,
            _ => Self::default(),
        }
    }
}

impl std::fmt::Display for RealtimeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Voices
// =============================================================================

/// Available voices for the Realtime API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RealtimeVoice {
    /// Alloy voice
    Alloy,
    /// Ash voice
    Ash,
    /// Ballad voice
    Ballad,
    /// Coral voice
    Coral,
    /// Echo voice
    Echo,
    /// Sage voice
    Sage,
    /// Shimmer voice
    Shimmer,
    /// Verse voice (default)
    #[default]
    Verse,
}

impl RealtimeVoice {
    /// Convert to the API parameter value.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Ash => "ash",
            Self::Ballad => "ballad",
            Self::Coral => "coral",
            Self::Echo => "echo",
            Self::Sage => "sage",
            Self::Shimmer => "shimmer",
            Self::Verse => "verse",
        }
    }

    /// Parse from string, with fallback to default.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "alloy" => Self::Alloy,
            "ash" => Self::Ash,
            "ballad" => Self::Ballad,
            "coral" => Self::Coral,
            "echo" => Self::Echo,
            "sage" => Self::Sage,
            "shimmer" => Self::Shimmer,
            "verse" => Self::Verse,
            _ => Self::default(),
        }
    }
}

impl std::fmt::Display for RealtimeVoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Audio Formats
// =============================================================================

/// Supported audio formats for the Realtime API.
///
/// The bridge always runs G.711 mu-law end to end so no transcoding happens
/// between the telephony leg and the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// PCM 16-bit signed little-endian
    Pcm16,
    /// G.711 u-law (default for telephony)
    #[default]
    #[serde(rename = "g711_ulaw")]
    G711Ulaw,
    /// G.711 a-law
    #[serde(rename = "g711_alaw")]
    G711Alaw,
}

impl AudioFormat {
    /// Convert to the API parameter value.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pcm16 => "pcm16",
            Self::G711Ulaw => "g711_ulaw",
            Self::G711Alaw => "g711_alaw",
        }
    }
}

// =============================================================================
// Session Settings
// =============================================================================

/// Everything a model session needs to connect and configure itself.
#[derive(Debug, Clone)]
pub struct ModelSessionSettings {
    /// API key for the realtime endpoint.
    pub api_key: String,
    /// Model to run the session against.
    pub model: RealtimeModel,
    /// Voice for audio output.
    pub voice: RealtimeVoice,
    /// Standing instructions for the assistant.
    pub instructions: String,
    /// User-role prompt sent once after configuration.
    pub greeting: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Delay before the configuration handshake.
    pub configure_delay: Duration,
}

impl Default for ModelSessionSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: RealtimeModel::default(),
            voice: RealtimeVoice::default(),
            instructions: SYSTEM_INSTRUCTIONS.to_string(),
            greeting: GREETING_PROMPT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            configure_delay: DEFAULT_CONFIGURE_DELAY,
        }
    }
}
