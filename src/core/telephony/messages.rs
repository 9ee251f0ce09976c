//! Twilio Media Streams frame types.
//!
//! Both directions are JSON frames discriminated by an `event` field.
//! Audio payloads are opaque base64 strings (G.711 mu-law); the bridge never
//! transcodes them.
//!
//! Inbound (telephony -> bridge): `start`, `media`, `mark`, plus connection
//! bookkeeping events (`connected`, `stop`) which carry no relay semantics.
//!
//! Outbound (bridge -> telephony): `media`, `mark`, `clear`, `stop`.

use serde::{Deserialize, Serialize};

/// Fixed acknowledgment token name requested after each relayed audio chunk.
pub const MARK_NAME: &str = "responsePart";

// =============================================================================
// Inbound Frames (telephony -> bridge)
// =============================================================================

/// Inbound frames from the telephony media stream.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum CallFrame {
    /// Stream started; carries the call/stream identity.
    Start {
        /// Stream metadata.
        start: StreamStart,
    },

    /// Caller audio chunk.
    Media {
        /// Audio payload and playhead timestamp.
        media: CallerAudio,
    },

    /// Playback acknowledgment for a previously requested mark.
    Mark {
        /// Mark metadata (token name).
        #[serde(default)]
        mark: Option<MarkInfo>,
    },

    /// Any other telephony event (`connected`, `stop`, ...). Logged and
    /// otherwise ignored.
    #[serde(other)]
    Other,
}

/// Payload of the `start` frame.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamStart {
    /// Stream identifier assigned by the telephony side.
    pub stream_sid: String,
    /// Call identifier.
    pub call_sid: String,
    /// Account identifier.
    pub account_sid: String,
}

/// Payload of the `media` frame.
#[derive(Debug, Clone, Deserialize)]
pub struct CallerAudio {
    /// Milliseconds since stream start, from the telephony side's clock.
    pub timestamp: u64,
    /// Base64-encoded mu-law audio.
    pub payload: String,
}

/// Payload of the `mark` frame.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkInfo {
    /// Token name previously requested by the bridge.
    pub name: String,
}

// =============================================================================
// Outbound Frames (bridge -> telephony)
// =============================================================================

/// Outbound frames to the telephony media stream.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum TelephonyFrame {
    /// Assistant audio chunk for playback.
    Media {
        /// Target stream.
        #[serde(rename = "streamSid")]
        stream_sid: String,
        /// Audio payload.
        media: OutboundMedia,
    },

    /// Request a playback acknowledgment for the audio sent so far.
    Mark {
        /// Target stream.
        #[serde(rename = "streamSid")]
        stream_sid: String,
        /// Token name to echo back.
        mark: OutboundMark,
    },

    /// Flush any buffered-but-unplayed audio on the telephony side.
    Clear {
        /// Target stream.
        #[serde(rename = "streamSid")]
        stream_sid: String,
    },

    /// End the call.
    Stop {
        /// Target stream.
        #[serde(rename = "streamSid")]
        stream_sid: String,
        /// Identity echoed back on hangup.
        stop: StopInfo,
    },
}

/// Audio payload of an outbound `media` frame.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMedia {
    /// Base64-encoded mu-law audio, forwarded opaquely from the model.
    pub payload: String,
}

/// Payload of an outbound `mark` frame.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMark {
    /// Token name.
    pub name: String,
}

/// Payload of an outbound `stop` frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopInfo {
    /// Account identifier captured at stream start.
    pub account_sid: String,
    /// Call identifier captured at stream start.
    pub call_sid: String,
}
