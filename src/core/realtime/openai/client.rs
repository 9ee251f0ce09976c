//! OpenAI Realtime API session bound to one telephony call.
//!
//! `ModelSession` owns the WebSocket to the Realtime API for a single call.
//! The socket is opened in a spawned task so the telephony handler never
//! blocks on the upstream handshake; outbound events are queued on an mpsc
//! channel and dropped silently while the socket is not writable.
//!
//! `SessionCore` holds the event-handling logic separately from the socket
//! plumbing so the barge-in and tool behavior is testable over plain
//! channels.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};

use super::config::{ModelSessionSettings, OPENAI_REALTIME_URL};
use super::messages::{ClientEvent, ServerEvent, SessionConfig, TurnDetection};
use crate::core::call::CallState;
use crate::core::realtime::base::{RealtimeError, RealtimeResult};
use crate::core::telephony::TwilioRelay;
use crate::tools::{self, DocumentSource};

/// Channel capacity for WebSocket message sending.
const WS_CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// Session Core
// =============================================================================

/// Event-handling half of a model session.
///
/// Holds no socket; events go out through the mpsc channel feeding the
/// connection task, and telephony effects go through the relay.
#[derive(Clone)]
pub struct SessionCore {
    event_tx: mpsc::Sender<ClientEvent>,
    relay: TwilioRelay,
    state: Arc<Mutex<CallState>>,
    documents: Arc<dyn DocumentSource>,
}

impl SessionCore {
    /// Create a core writing client events into `event_tx`.
    pub fn new(
        event_tx: mpsc::Sender<ClientEvent>,
        relay: TwilioRelay,
        documents: Arc<dyn DocumentSource>,
    ) -> Self {
        let state = relay.state();
        Self {
            event_tx,
            relay,
            state,
            documents,
        }
    }

    /// Queue an event for the model socket. A full or closed channel means
    /// the socket is not writable; the event is dropped, matching the
    /// fire-and-forget send semantics of the session.
    fn send_event(&self, event: ClientEvent) {
        if self.event_tx.try_send(event).is_err() {
            tracing::debug!("Model channel not writable; dropping client event");
        }
    }

    /// Forward one chunk of caller audio.
    ///
    /// The playhead timestamp is recorded unconditionally, even when the
    /// model socket is not writable; the interruption math depends on it
    /// staying current for the whole call.
    pub async fn send_audio(&self, payload: String, timestamp_ms: u64) {
        self.send_event(ClientEvent::audio_append(payload));
        self.state.lock().await.timing.latest_media_timestamp_ms = timestamp_ms;
    }

    /// Send the session-configuration burst: session.update, the greeting
    /// conversation item, and response.create so the assistant speaks first.
    pub fn configure(&self, settings: &ModelSessionSettings) {
        let session = SessionConfig {
            modalities: Some(vec!["text".to_string(), "audio".to_string()]),
            instructions: Some(settings.instructions.clone()),
            voice: Some(settings.voice.as_str().to_string()),
            input_audio_format: Some("g711_ulaw".to_string()),
            output_audio_format: Some("g711_ulaw".to_string()),
            turn_detection: Some(TurnDetection::ServerVad {}),
            tools: Some(vec![tools::biography::definition()]),
            tool_choice: Some("auto".to_string()),
            temperature: Some(settings.temperature),
        };

        tracing::info!("Sending session configuration");
        self.send_event(ClientEvent::SessionUpdate { session });
        self.send_event(ClientEvent::user_text(settings.greeting.clone()));
        self.send_event(ClientEvent::ResponseCreate {});
    }

    /// Dispatch one parsed server event.
    pub async fn handle_server_event(&self, event: ServerEvent) {
        match event {
            ServerEvent::ResponseDone { response } => {
                if response.status.as_deref() == Some("failed") {
                    tracing::error!("Model response failed; ending call");
                    self.relay.hangup().await;
                    return;
                }

                let call = response
                    .output
                    .first()
                    .filter(|item| item.is_function_call(tools::biography::FUNCTION_NAME))
                    .and_then(|item| item.call_id.clone());
                if let Some(call_id) = call {
                    let output = self.documents.fetch().await;
                    self.send_event(ClientEvent::function_output(call_id, output));
                }
            }

            ServerEvent::AudioDelta { delta, item_id } => {
                self.relay.play_audio(delta).await;

                let mut state = self.state.lock().await;
                // First delta of a new utterance starts the elapsed counter
                state.timing.begin_response();
                if let Some(item_id) = item_id {
                    state.timing.last_assistant_item = Some(item_id);
                }
            }

            ServerEvent::SpeechStarted { audio_start_ms } => {
                tracing::debug!(?audio_start_ms, "Caller speech started");
                self.handle_interruption().await;
            }

            ServerEvent::Error { error } => {
                tracing::error!(
                    "Model session error: {} - {}",
                    error.error_type.as_deref().unwrap_or("unknown"),
                    error.message.as_deref().unwrap_or("")
                );
            }

            ServerEvent::SessionCreated { session } => {
                tracing::info!("Model session created: {}", session.id);
            }

            ServerEvent::SessionUpdated {} => {
                tracing::debug!("Model session configuration acknowledged");
            }

            ServerEvent::ResponseContentDone {}
            | ServerEvent::RateLimitsUpdated {}
            | ServerEvent::InputAudioCommitted {}
            | ServerEvent::SpeechStopped {} => {
                tracing::debug!("Model diagnostic event");
            }

            ServerEvent::Other => {
                tracing::trace!("Unhandled model event");
            }
        }
    }

    /// Barge-in: the caller started speaking over an in-flight assistant
    /// utterance.
    ///
    /// No-op when no utterance is streaming. Otherwise the utterance is
    /// truncated at the heard playback point (skipped when nothing has been
    /// heard yet or the item is unknown), buffered telephony audio is
    /// flushed, and the timing state is retired so a repeat of this event
    /// does nothing.
    ///
    /// Elapsed time compares the caller-audio playhead with the timestamp
    /// captured at first delta; both are assumed to share the telephony
    /// clock. Saturating subtraction keeps a skewed clock at zero.
    async fn handle_interruption(&self) {
        let truncate = {
            let mut state = self.state.lock().await;
            let Some(elapsed_ms) = state.timing.elapsed_ms() else {
                return;
            };

            let item = if elapsed_ms > 0 {
                state.timing.last_assistant_item.take()
            } else {
                None
            };
            state.timing.reset();
            item.map(|item_id| (item_id, elapsed_ms))
        };

        if let Some((item_id, audio_end_ms)) = truncate {
            tracing::debug!(%item_id, audio_end_ms, "Truncating interrupted utterance");
            self.send_event(ClientEvent::ConversationItemTruncate {
                item_id,
                content_index: 0,
                audio_end_ms,
            });
        }

        // Flush runs even when truncate was skipped: buffered audio can
        // exist with zero heard playback.
        self.relay.clear_buffer().await;
    }
}

// =============================================================================
// Model Session
// =============================================================================

/// One live model session: the connection task plus its event-handling core.
pub struct ModelSession {
    core: SessionCore,
    settings: ModelSessionSettings,
    connection: JoinHandle<()>,
    configure_timer: JoinHandle<()>,
}

impl ModelSession {
    /// Open a session for one call.
    ///
    /// Returns immediately; the WebSocket handshake runs in a spawned task.
    /// Events sent before the socket is up are dropped, the same as after
    /// it goes down.
    pub fn open(
        settings: ModelSessionSettings,
        relay: TwilioRelay,
        documents: Arc<dyn DocumentSource>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(WS_CHANNEL_CAPACITY);
        let core = SessionCore::new(event_tx, relay, documents);

        let connection = {
            let core = core.clone();
            let settings = settings.clone();
            tokio::spawn(async move {
                if let Err(e) = run_connection(&core, &settings, event_rx).await {
                    tracing::error!("Model connection ended with error: {}", e);
                }
            })
        };

        // The configuration burst is deferred; the timer outlives a fast
        // connect failure harmlessly since its sends just drop.
        let configure_timer = {
            let core = core.clone();
            let settings = settings.clone();
            tokio::spawn(async move {
                tokio::time::sleep(settings.configure_delay).await;
                core.configure(&settings);
            })
        };

        Self {
            core,
            settings,
            connection,
            configure_timer,
        }
    }

    /// Settings this session was opened with.
    pub fn settings(&self) -> &ModelSessionSettings {
        &self.settings
    }

    /// Forward one chunk of caller audio.
    pub async fn send_audio(&self, payload: String, timestamp_ms: u64) {
        self.core.send_audio(payload, timestamp_ms).await;
    }

    /// Tear the session down. Aborting the connection task closes the
    /// upstream socket.
    pub fn close(&self) {
        self.configure_timer.abort();
        self.connection.abort();
        tracing::info!("Model session closed");
    }
}

impl Drop for ModelSession {
    fn drop(&mut self) {
        self.configure_timer.abort();
        self.connection.abort();
    }
}

/// Build the WebSocket handshake request for the realtime endpoint.
fn build_request(settings: &ModelSessionSettings) -> RealtimeResult<http::Request<()>> {
    let url = format!("{}?model={}", OPENAI_REALTIME_URL, settings.model.as_str());

    http::Request::builder()
        .uri(&url)
        .header("Authorization", format!("Bearer {}", settings.api_key))
        .header("OpenAI-Beta", "realtime=v1")
        .header(
            "Sec-WebSocket-Key",
            tungstenite::handshake::client::generate_key(),
        )
        .header("Sec-WebSocket-Version", "13")
        .header("Connection", "Upgrade")
        .header("Upgrade", "websocket")
        .header("Host", "api.openai.com")
        .body(())
        .map_err(|e| RealtimeError::InvalidConfiguration(e.to_string()))
}

/// Connect and pump the model socket until either side closes.
///
/// Malformed inbound JSON ends the call: the bridge can no longer trust its
/// view of the model conversation, so it hangs up rather than continue
/// desynced.
async fn run_connection(
    core: &SessionCore,
    settings: &ModelSessionSettings,
    mut event_rx: mpsc::Receiver<ClientEvent>,
) -> RealtimeResult<()> {
    let request = build_request(settings)?;
    let (ws_stream, _) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| RealtimeError::ConnectionFailed(e.to_string()))?;
    tracing::info!(model = %settings.model, "Connected to realtime API");

    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    loop {
        tokio::select! {
            // Outgoing client events
            Some(event) = event_rx.recv() => {
                let json = match serde_json::to_string(&event) {
                    Ok(j) => j,
                    Err(e) => {
                        tracing::error!("Failed to serialize client event: {}", e);
                        continue;
                    }
                };

                if let Err(e) = ws_sink.send(Message::Text(json.into())).await {
                    return Err(RealtimeError::WebSocketError(e.to_string()));
                }
            }

            // Incoming server events
            Some(msg) = ws_stream.next() => {
                match msg {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<ServerEvent>(&text) {
                            Ok(event) => core.handle_server_event(event).await,
                            Err(e) => {
                                tracing::error!("Undecodable model event, ending call: {}", e);
                                core.relay.hangup().await;
                                return Err(RealtimeError::SerializationError(e.to_string()));
                            }
                        }
                    }
                    Ok(Message::Close(_)) => {
                        tracing::info!("Model socket closed by server");
                        return Ok(());
                    }
                    Ok(Message::Ping(data)) => {
                        if let Err(e) = ws_sink.send(Message::Pong(data)).await {
                            return Err(RealtimeError::WebSocketError(e.to_string()));
                        }
                    }
                    Err(e) => {
                        return Err(RealtimeError::WebSocketError(e.to_string()));
                    }
                    _ => {}
                }
            }

            else => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::telephony::TelephonyFrame;
    use crate::core::telephony::messages::StreamStart;
    use async_trait::async_trait;

    struct StubSource(&'static str);

    #[async_trait]
    impl DocumentSource for StubSource {
        async fn fetch(&self) -> String {
            self.0.to_string()
        }
    }

    struct Harness {
        core: SessionCore,
        event_rx: mpsc::Receiver<ClientEvent>,
        frame_rx: mpsc::Receiver<TelephonyFrame>,
    }

    fn harness() -> Harness {
        let (event_tx, event_rx) = mpsc::channel(16);
        let (frame_tx, frame_rx) = mpsc::channel(16);
        let relay = TwilioRelay::new(frame_tx, Arc::new(Mutex::new(CallState::default())));
        let core = SessionCore::new(event_tx, relay, Arc::new(StubSource("bio text")));
        Harness {
            core,
            event_rx,
            frame_rx,
        }
    }

    async fn start_stream(core: &SessionCore) {
        core.relay
            .on_stream_start(StreamStart {
                stream_sid: "MZ1".to_string(),
                call_sid: "CA1".to_string(),
                account_sid: "AC1".to_string(),
            })
            .await;
    }

    fn delta(delta: &str, item_id: Option<&str>) -> ServerEvent {
        ServerEvent::AudioDelta {
            delta: delta.to_string(),
            item_id: item_id.map(str::to_string),
        }
    }

    fn speech_started() -> ServerEvent {
        ServerEvent::SpeechStarted {
            audio_start_ms: None,
        }
    }

    #[tokio::test]
    async fn test_send_audio_tracks_timestamp_even_when_channel_closed() {
        let mut h = harness();
        h.event_rx.close();

        h.core.send_audio("bXVsYXc=".to_string(), 640).await;

        assert_eq!(
            h.core.state.lock().await.timing.latest_media_timestamp_ms,
            640
        );
    }

    #[tokio::test]
    async fn test_audio_delta_starts_timing_and_relays() {
        let mut h = harness();
        start_stream(&h.core).await;
        h.core.send_audio("YQ==".to_string(), 100).await;
        h.event_rx.try_recv().unwrap(); // drain the append

        h.core.handle_server_event(delta("Yg==", Some("item-1"))).await;

        let state = h.core.state.lock().await;
        assert_eq!(state.timing.response_start_ms, Some(100));
        assert_eq!(state.timing.last_assistant_item.as_deref(), Some("item-1"));
        drop(state);

        assert!(matches!(
            h.frame_rx.try_recv().unwrap(),
            TelephonyFrame::Media { .. }
        ));
        assert!(matches!(
            h.frame_rx.try_recv().unwrap(),
            TelephonyFrame::Mark { .. }
        ));
    }

    #[tokio::test]
    async fn test_second_delta_does_not_move_response_start() {
        let h = harness();
        start_stream(&h.core).await;
        h.core.send_audio("YQ==".to_string(), 100).await;
        h.core.handle_server_event(delta("Yg==", Some("item-1"))).await;
        h.core.send_audio("YQ==".to_string(), 900).await;

        h.core.handle_server_event(delta("Yw==", Some("item-1"))).await;

        assert_eq!(
            h.core.state.lock().await.timing.response_start_ms,
            Some(100)
        );
    }

    #[tokio::test]
    async fn test_interruption_truncates_at_elapsed_time() {
        let mut h = harness();
        start_stream(&h.core).await;
        h.core.send_audio("YQ==".to_string(), 100).await;
        h.core.handle_server_event(delta("Yg==", Some("item-1"))).await;
        h.core.send_audio("YQ==".to_string(), 1600).await;
        while h.event_rx.try_recv().is_ok() {}
        while h.frame_rx.try_recv().is_ok() {}

        h.core.handle_server_event(speech_started()).await;

        match h.event_rx.try_recv().unwrap() {
            ClientEvent::ConversationItemTruncate {
                item_id,
                content_index,
                audio_end_ms,
            } => {
                assert_eq!(item_id, "item-1");
                assert_eq!(content_index, 0);
                assert_eq!(audio_end_ms, 1500);
            }
            other => panic!("Expected truncate, got {other:?}"),
        }
        assert!(matches!(
            h.frame_rx.try_recv().unwrap(),
            TelephonyFrame::Clear { .. }
        ));

        let state = h.core.state.lock().await;
        assert_eq!(state.timing.response_start_ms, None);
        assert_eq!(state.timing.last_assistant_item, None);
        assert!(state.marks.is_empty());
    }

    #[tokio::test]
    async fn test_interruption_skips_truncate_at_zero_elapsed() {
        let mut h = harness();
        start_stream(&h.core).await;
        h.core.send_audio("YQ==".to_string(), 100).await;
        h.core.handle_server_event(delta("Yg==", Some("item-1"))).await;
        // Playhead has not advanced past the utterance start
        while h.event_rx.try_recv().is_ok() {}
        while h.frame_rx.try_recv().is_ok() {}

        h.core.handle_server_event(speech_started()).await;

        assert!(h.event_rx.try_recv().is_err());
        // Buffered audio is still flushed
        assert!(matches!(
            h.frame_rx.try_recv().unwrap(),
            TelephonyFrame::Clear { .. }
        ));
        assert_eq!(h.core.state.lock().await.timing.response_start_ms, None);
    }

    #[tokio::test]
    async fn test_interruption_is_idempotent() {
        let mut h = harness();
        start_stream(&h.core).await;
        h.core.send_audio("YQ==".to_string(), 100).await;
        h.core.handle_server_event(delta("Yg==", Some("item-1"))).await;
        h.core.send_audio("YQ==".to_string(), 1600).await;

        h.core.handle_server_event(speech_started()).await;
        while h.event_rx.try_recv().is_ok() {}
        while h.frame_rx.try_recv().is_ok() {}

        // Second speech start with no utterance in flight does nothing
        h.core.handle_server_event(speech_started()).await;

        assert!(h.event_rx.try_recv().is_err());
        assert!(h.frame_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_tool_call_round_trip() {
        let mut h = harness();
        start_stream(&h.core).await;

        let event: ServerEvent = serde_json::from_str(
            r#"{
                "type": "response.done",
                "response": {
                    "status": "completed",
                    "output": [
                        {"type": "function_call", "name": "load_biography", "call_id": "cid-1", "arguments": "{}"}
                    ]
                }
            }"#,
        )
        .unwrap();
        h.core.handle_server_event(event).await;

        match h.event_rx.try_recv().unwrap() {
            ClientEvent::ConversationItemCreate { item } => {
                assert_eq!(item.item_type, "function_call_output");
                assert_eq!(item.call_id.as_deref(), Some("cid-1"));
                assert_eq!(item.output.as_deref(), Some("bio text"));
            }
            other => panic!("Expected function output, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_completed_response_without_tool_call_is_quiet() {
        let mut h = harness();
        start_stream(&h.core).await;

        let event: ServerEvent = serde_json::from_str(
            r#"{"type": "response.done", "response": {"status": "completed", "output": [{"type": "message"}]}}"#,
        )
        .unwrap();
        h.core.handle_server_event(event).await;

        assert!(h.event_rx.try_recv().is_err());
        assert!(h.frame_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_response_hangs_up() {
        let mut h = harness();
        start_stream(&h.core).await;

        let event: ServerEvent = serde_json::from_str(
            r#"{"type": "response.done", "response": {"status": "failed", "output": []}}"#,
        )
        .unwrap();
        h.core.handle_server_event(event).await;

        assert!(matches!(
            h.frame_rx.try_recv().unwrap(),
            TelephonyFrame::Stop { .. }
        ));
    }

    #[tokio::test]
    async fn test_stream_restart_disarms_interruption() {
        let mut h = harness();
        start_stream(&h.core).await;
        h.core.send_audio("YQ==".to_string(), 100).await;
        h.core.handle_server_event(delta("Yg==", Some("item-1"))).await;
        h.core.send_audio("YQ==".to_string(), 1600).await;
        while h.event_rx.try_recv().is_ok() {}
        while h.frame_rx.try_recv().is_ok() {}

        start_stream(&h.core).await;
        h.core.handle_server_event(speech_started()).await;

        assert!(h.event_rx.try_recv().is_err());
        assert!(h.frame_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_configure_burst_order() {
        let mut h = harness();

        h.core.configure(&ModelSessionSettings::default());

        match h.event_rx.try_recv().unwrap() {
            ClientEvent::SessionUpdate { session } => {
                assert_eq!(session.voice.as_deref(), Some("verse"));
                assert_eq!(session.input_audio_format.as_deref(), Some("g711_ulaw"));
                assert_eq!(session.tool_choice.as_deref(), Some("auto"));
                assert_eq!(session.tools.as_ref().map(Vec::len), Some(1));
            }
            other => panic!("Expected session.update, got {other:?}"),
        }
        assert!(matches!(
            h.event_rx.try_recv().unwrap(),
            ClientEvent::ConversationItemCreate { .. }
        ));
        assert!(matches!(
            h.event_rx.try_recv().unwrap(),
            ClientEvent::ResponseCreate {}
        ));
    }
}
