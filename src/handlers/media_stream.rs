//! Telephony media-stream WebSocket handler.
//!
//! Binds exactly one model session to one telephony connection. The model
//! session is opened lazily on the first inbound frame, so a connection that
//! never sends anything never opens an upstream socket.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info, warn};

use crate::core::call::CallState;
use crate::core::realtime::ModelSession;
use crate::core::telephony::{CallFrame, TelephonyFrame, TwilioRelay};
use crate::state::AppState;

/// Channel buffer size for outbound telephony frames.
const CHANNEL_BUFFER_SIZE: usize = 1024;

/// Media-stream WebSocket handler.
pub async fn media_stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    info!("Media stream connection upgrade requested");
    ws.on_upgrade(move |socket| handle_media_stream(socket, state))
}

/// Run one telephony connection to completion.
async fn handle_media_stream(socket: WebSocket, app_state: Arc<AppState>) {
    info!("Media stream connected");

    let (mut sender, mut receiver) = socket.split();
    let (frame_tx, mut frame_rx) = mpsc::channel::<TelephonyFrame>(CHANNEL_BUFFER_SIZE);

    // Writer task serializing outbound frames
    let sender_task = tokio::spawn(async move {
        while let Some(frame) = frame_rx.recv().await {
            let json = match serde_json::to_string(&frame) {
                Ok(j) => j,
                Err(e) => {
                    error!("Failed to serialize telephony frame: {}", e);
                    continue;
                }
            };

            if let Err(e) = sender.send(Message::Text(json.into())).await {
                error!("Failed to send telephony frame: {}", e);
                break;
            }
        }
    });

    let relay = TwilioRelay::new(frame_tx, Arc::new(Mutex::new(CallState::default())));
    let mut session: Option<ModelSession> = None;

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let session = session.get_or_insert_with(|| {
                    ModelSession::open(
                        app_state.config.session_settings(),
                        relay.clone(),
                        app_state.documents.clone(),
                    )
                });

                match serde_json::from_str::<CallFrame>(&text) {
                    Ok(CallFrame::Media { media }) => {
                        session.send_audio(media.payload, media.timestamp).await;
                    }
                    Ok(CallFrame::Start { start }) => {
                        relay.on_stream_start(start).await;
                    }
                    Ok(CallFrame::Mark { .. }) => {
                        relay.on_playback_ack().await;
                    }
                    Ok(CallFrame::Other) => {
                        debug!("Unhandled telephony event");
                    }
                    // A bad frame never tears down the call by itself
                    Err(e) => {
                        warn!("Malformed telephony frame: {}", e);
                    }
                }
            }
            Ok(Message::Close(_)) => {
                info!("Media stream closed by client");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Media stream WebSocket error: {}", e);
                break;
            }
        }
    }

    if let Some(session) = session {
        session.close();
    }
    sender_task.abort();
    info!("Media stream disconnected");
}
