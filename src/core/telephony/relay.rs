//! Telephony relay: the bridge's handle on the caller-facing media stream.
//!
//! The relay owns stream identity and the mark acknowledgment queue, and
//! translates relay-level intents (play audio, clear buffer, hang up) into
//! telephony-protocol frames. Frames are handed to a writer task through an
//! mpsc channel; the relay never raises on a closed channel, it only logs.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use crate::core::call::{CallState, StreamIdentity};
use crate::core::telephony::messages::{
    MARK_NAME, OutboundMark, OutboundMedia, StopInfo, StreamStart, TelephonyFrame,
};

/// Cloneable handle over one call's telephony channel.
///
/// Clones share the same outbound channel and `CallState`; the model session
/// holds a clone so both sides of the bridge mutate a single state value.
#[derive(Clone)]
pub struct TwilioRelay {
    outbound: mpsc::Sender<TelephonyFrame>,
    state: Arc<Mutex<CallState>>,
}

impl TwilioRelay {
    /// Create a relay writing frames into `outbound` and sharing `state`.
    pub fn new(outbound: mpsc::Sender<TelephonyFrame>, state: Arc<Mutex<CallState>>) -> Self {
        Self { outbound, state }
    }

    /// Shared per-call state, for the model session side of the bridge.
    pub fn state(&self) -> Arc<Mutex<CallState>> {
        self.state.clone()
    }

    /// Handle the telephony `start` frame: capture stream identity and reset
    /// all timing state for the fresh call.
    pub async fn on_stream_start(&self, start: StreamStart) {
        info!(stream_sid = %start.stream_sid, "Incoming media stream started");
        let mut state = self.state.lock().await;
        state.start_stream(StreamIdentity {
            stream_sid: start.stream_sid,
            call_sid: start.call_sid,
            account_sid: start.account_sid,
        });
    }

    /// Handle a telephony `mark` acknowledgment: pop one pending token.
    /// An empty queue is a no-op, not an error.
    pub async fn on_playback_ack(&self) {
        let mut state = self.state.lock().await;
        if state.marks.pop().is_none() {
            debug!("Playback ack with empty mark queue");
        }
    }

    /// Relay one chunk of assistant audio to the caller, followed by a mark
    /// frame requesting a playback acknowledgment.
    ///
    /// No-op when the stream has not started yet (no `streamSid` to tag
    /// frames with).
    pub async fn play_audio(&self, payload: String) {
        let stream_sid = {
            let state = self.state.lock().await;
            match &state.stream {
                Some(identity) => identity.stream_sid.clone(),
                None => {
                    warn!("Dropping assistant audio: media stream not started");
                    return;
                }
            }
        };

        self.send_frame(TelephonyFrame::Media {
            stream_sid: stream_sid.clone(),
            media: OutboundMedia { payload },
        })
        .await;
        self.send_frame(TelephonyFrame::Mark {
            stream_sid,
            mark: OutboundMark {
                name: MARK_NAME.to_string(),
            },
        })
        .await;

        self.state.lock().await.marks.push(MARK_NAME);
    }

    /// Flush buffered-but-unplayed audio on the telephony side and drop all
    /// pending acknowledgments.
    pub async fn clear_buffer(&self) {
        let stream_sid = {
            let mut state = self.state.lock().await;
            state.marks.clear();
            state.stream.as_ref().map(|s| s.stream_sid.clone())
        };

        match stream_sid {
            Some(stream_sid) => self.send_frame(TelephonyFrame::Clear { stream_sid }).await,
            None => warn!("Skipping buffer clear: media stream not started"),
        }
    }

    /// End the call. Used on unrecoverable model-session errors.
    pub async fn hangup(&self) {
        let identity = self.state.lock().await.stream.clone();
        match identity {
            Some(identity) => {
                info!(stream_sid = %identity.stream_sid, "Hanging up call");
                self.send_frame(TelephonyFrame::Stop {
                    stream_sid: identity.stream_sid,
                    stop: StopInfo {
                        account_sid: identity.account_sid,
                        call_sid: identity.call_sid,
                    },
                })
                .await;
            }
            None => warn!("Skipping hangup: media stream not started"),
        }
    }

    /// Hand a frame to the writer task. A closed channel means the telephony
    /// socket is gone; the frame is dropped with a warning.
    async fn send_frame(&self, frame: TelephonyFrame) {
        if self.outbound.send(frame).await.is_err() {
            warn!("Telephony channel closed; dropping outbound frame");
        }
    }
}
