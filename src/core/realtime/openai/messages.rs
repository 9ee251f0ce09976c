//! OpenAI Realtime API WebSocket message types.
//!
//! All events are JSON objects discriminated by a `type` field.
//!
//! Client events (sent to server):
//! - session.update - Configure voice, formats, instructions, tools
//! - input_audio_buffer.append - Append caller audio to the input buffer
//! - conversation.item.create - Add an item (message or tool output)
//! - conversation.item.truncate - Cut an assistant item at a playback point
//! - response.create - Trigger model inference
//!
//! Server events (received from server): only the handful the bridge reacts
//! to are modeled as typed variants; a small diagnostic allow-list is parsed
//! for logging, and everything else falls through to `Other`.

use serde::{Deserialize, Serialize};

// =============================================================================
// Session Configuration
// =============================================================================

/// Session configuration sent in `session.update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Response modalities (text, audio)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modalities: Option<Vec<String>>,

    /// System instructions for the assistant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    /// Voice for audio output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,

    /// Input audio format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_audio_format: Option<String>,

    /// Output audio format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_audio_format: Option<String>,

    /// Turn detection configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_detection: Option<TurnDetection>,

    /// Tool definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDef>>,

    /// Tool choice strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,

    /// Temperature for response generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Turn detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TurnDetection {
    /// Server-side VAD with provider defaults
    #[serde(rename = "server_vad")]
    ServerVad {},
}

/// Tool definition advertised to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    /// Tool type (always "function")
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function name
    pub name: String,
    /// Function description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Function parameters JSON schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

// =============================================================================
// Conversation Items
// =============================================================================

/// Conversation item for `conversation.item.create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationItem {
    /// Item type (message, function_call_output)
    #[serde(rename = "type")]
    pub item_type: String,
    /// Item role (user, assistant, system)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<ContentPart>>,
    /// Call ID for a function call result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    /// Function output for a function call result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Content part within a conversation item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPart {
    /// Content type (input_text, text, audio)
    #[serde(rename = "type")]
    pub content_type: String,
    /// Text content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// =============================================================================
// Client Events
// =============================================================================

/// Events sent from the bridge to the Realtime API.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Update session configuration
    #[serde(rename = "session.update")]
    SessionUpdate {
        /// Session configuration
        session: SessionConfig,
    },

    /// Append audio to the input buffer
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioAppend {
        /// Base64-encoded audio payload
        audio: String,
    },

    /// Add an item to the conversation
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate {
        /// Item to add
        item: ConversationItem,
    },

    /// Truncate a previous assistant message's audio at a playback point
    #[serde(rename = "conversation.item.truncate")]
    ConversationItemTruncate {
        /// Assistant item to truncate
        item_id: String,
        /// Content part index (always 0 for single-part audio)
        content_index: u32,
        /// Playback point in milliseconds
        audio_end_ms: u64,
    },

    /// Trigger model inference
    #[serde(rename = "response.create")]
    ResponseCreate {},
}

impl ClientEvent {
    /// Build an audio append event from an already base64-encoded payload.
    pub fn audio_append(payload: String) -> Self {
        ClientEvent::InputAudioAppend { audio: payload }
    }

    /// Build a user text message item.
    pub fn user_text(text: impl Into<String>) -> Self {
        ClientEvent::ConversationItemCreate {
            item: ConversationItem {
                item_type: "message".to_string(),
                role: Some("user".to_string()),
                content: Some(vec![ContentPart {
                    content_type: "input_text".to_string(),
                    text: Some(text.into()),
                }]),
                call_id: None,
                output: None,
            },
        }
    }

    /// Build a function call output item answering `call_id`.
    pub fn function_output(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        ClientEvent::ConversationItemCreate {
            item: ConversationItem {
                item_type: "function_call_output".to_string(),
                role: None,
                content: None,
                call_id: Some(call_id.into()),
                output: Some(output.into()),
            },
        }
    }
}

// =============================================================================
// Server Events
// =============================================================================

/// Events received from the Realtime API.
///
/// Unmodeled event types parse as `Other` and are trace-logged, never
/// treated as protocol errors. Only undecodable JSON is fatal to a session.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// A response finished streaming, in any final state
    #[serde(rename = "response.done")]
    ResponseDone {
        /// Response outcome, without raw audio data
        response: ResponseOutcome,
    },

    /// Assistant audio chunk
    #[serde(rename = "response.audio.delta")]
    AudioDelta {
        /// Base64-encoded audio
        delta: String,
        /// Assistant item the audio belongs to
        #[serde(default)]
        item_id: Option<String>,
    },

    /// Caller speech detected by server-side VAD
    #[serde(rename = "input_audio_buffer.speech_started")]
    SpeechStarted {
        /// Audio timestamp in milliseconds
        #[serde(default)]
        audio_start_ms: Option<u64>,
    },

    /// Provider-reported error
    #[serde(rename = "error")]
    Error {
        /// Error details
        error: ErrorDetail,
    },

    /// Session created by the provider
    #[serde(rename = "session.created")]
    SessionCreated {
        /// Session metadata
        session: SessionMeta,
    },

    /// Session configuration acknowledged
    #[serde(rename = "session.updated")]
    SessionUpdated {},

    /// Response content part finished
    #[serde(rename = "response.content.done")]
    ResponseContentDone {},

    /// Rate limit headroom update
    #[serde(rename = "rate_limits.updated")]
    RateLimitsUpdated {},

    /// Input buffer committed for inference
    #[serde(rename = "input_audio_buffer.committed")]
    InputAudioCommitted {},

    /// Caller speech ended
    #[serde(rename = "input_audio_buffer.speech_stopped")]
    SpeechStopped {},

    /// Any other event type
    #[serde(other)]
    Other,
}

/// Outcome carried by `response.done`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseOutcome {
    /// Final status (completed, failed, cancelled, ...)
    #[serde(default)]
    pub status: Option<String>,
    /// Output items, raw audio omitted
    #[serde(default)]
    pub output: Vec<OutputItem>,
}

/// Output item within a finished response.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputItem {
    /// Item type (message, function_call)
    #[serde(rename = "type", default)]
    pub item_type: Option<String>,
    /// Function name, for function_call items
    #[serde(default)]
    pub name: Option<String>,
    /// Call ID, for function_call items
    #[serde(default)]
    pub call_id: Option<String>,
    /// JSON-encoded arguments, for function_call items
    #[serde(default)]
    pub arguments: Option<String>,
}

impl OutputItem {
    /// Whether this item is a call of the named function.
    pub fn is_function_call(&self, function_name: &str) -> bool {
        self.item_type.as_deref() == Some("function_call")
            && self.name.as_deref() == Some(function_name)
    }
}

/// Error details from the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    /// Error type
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
}

/// Session metadata from `session.created`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionMeta {
    /// Provider-assigned session ID
    pub id: String,
}
