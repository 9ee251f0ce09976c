//! Per-call state shared between the telephony relay and the model session.
//!
//! One `CallState` exists per connected call. It is created when the
//! telephony WebSocket is accepted and discarded when that socket closes.
//! Both sides of the bridge hold it behind `Arc<tokio::sync::Mutex<_>>`;
//! cross-channel coordination (barge-in handling in particular) happens only
//! through this value, never through shared closures.

use std::collections::VecDeque;

/// Identity of the telephony media stream, captured from the `start` frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamIdentity {
    /// Stream identifier assigned by the telephony side.
    pub stream_sid: String,
    /// Call identifier, echoed back on hangup.
    pub call_sid: String,
    /// Account identifier, echoed back on hangup.
    pub account_sid: String,
}

/// Playback timing for the assistant utterance currently streaming to the
/// caller.
///
/// `response_start_ms` is `Some` only while an assistant utterance is
/// actively streaming; it is cleared whenever an interruption is processed
/// or a new stream starts.
#[derive(Debug, Clone, Default)]
pub struct PlaybackTiming {
    /// Telephony-side playhead, updated from each caller-audio frame's
    /// embedded timestamp.
    pub latest_media_timestamp_ms: u64,
    /// `latest_media_timestamp_ms` at the moment the first audio chunk of
    /// the current assistant utterance was forwarded.
    pub response_start_ms: Option<u64>,
    /// Item id of the assistant utterance currently being streamed.
    pub last_assistant_item: Option<String>,
}

impl PlaybackTiming {
    /// Mark the start of a new assistant utterance if one is not already in
    /// flight.
    pub fn begin_response(&mut self) {
        if self.response_start_ms.is_none() {
            self.response_start_ms = Some(self.latest_media_timestamp_ms);
        }
    }

    /// Milliseconds of the current utterance the caller has heard, or `None`
    /// when no utterance is in flight.
    ///
    /// Assumes caller-audio timestamps and assistant-audio delivery share
    /// the telephony side's clock domain. Saturating: a skewed clock yields
    /// zero rather than wrapping.
    pub fn elapsed_ms(&self) -> Option<u64> {
        self.response_start_ms
            .map(|start| self.latest_media_timestamp_ms.saturating_sub(start))
    }

    /// Retire the current utterance.
    pub fn reset(&mut self) {
        self.response_start_ms = None;
        self.last_assistant_item = None;
    }
}

/// FIFO queue of pending playback-acknowledgment tokens ("marks").
///
/// One token is pushed per relayed audio chunk and popped when the telephony
/// side confirms playback. Queue length is a lower bound on unconfirmed
/// audio; it is a liveness signal, not byte accounting.
#[derive(Debug, Clone, Default)]
pub struct AckQueue {
    tokens: VecDeque<String>,
}

impl AckQueue {
    /// Push a pending acknowledgment token.
    pub fn push(&mut self, name: impl Into<String>) {
        self.tokens.push_back(name.into());
    }

    /// Pop the oldest pending token. Popping an empty queue is a no-op.
    pub fn pop(&mut self) -> Option<String> {
        self.tokens.pop_front()
    }

    /// Drop all pending tokens.
    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// All mutable state for one call.
#[derive(Debug, Clone, Default)]
pub struct CallState {
    /// Stream identity; unset until the telephony `start` frame arrives.
    pub stream: Option<StreamIdentity>,
    /// Playback timing for the in-flight assistant utterance.
    pub timing: PlaybackTiming,
    /// Pending playback acknowledgments.
    pub marks: AckQueue,
}

impl CallState {
    /// Reset for a fresh media stream. A new call always starts with clean
    /// timing state, even if the process is reused.
    pub fn start_stream(&mut self, identity: StreamIdentity) {
        self.stream = Some(identity);
        self.timing = PlaybackTiming::default();
        self.marks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_queue_fifo() {
        let mut queue = AckQueue::default();
        queue.push("a");
        queue.push("b");
        queue.push("c");

        assert_eq!(queue.pop().as_deref(), Some("a"));
        assert_eq!(queue.pop().as_deref(), Some("b"));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop().as_deref(), Some("c"));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ack_queue_pop_empty_is_noop() {
        let mut queue = AckQueue::default();
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_begin_response_only_sets_once() {
        let mut timing = PlaybackTiming {
            latest_media_timestamp_ms: 100,
            ..Default::default()
        };
        timing.begin_response();
        assert_eq!(timing.response_start_ms, Some(100));

        timing.latest_media_timestamp_ms = 500;
        timing.begin_response();
        assert_eq!(timing.response_start_ms, Some(100));
    }

    #[test]
    fn test_elapsed_saturates() {
        let timing = PlaybackTiming {
            latest_media_timestamp_ms: 50,
            response_start_ms: Some(200),
            last_assistant_item: None,
        };
        assert_eq!(timing.elapsed_ms(), Some(0));
    }

    #[test]
    fn test_elapsed_unset_without_response() {
        let timing = PlaybackTiming::default();
        assert_eq!(timing.elapsed_ms(), None);
    }

    #[test]
    fn test_start_stream_resets_everything() {
        let mut state = CallState::default();
        state.timing.latest_media_timestamp_ms = 900;
        state.timing.response_start_ms = Some(100);
        state.timing.last_assistant_item = Some("item-1".to_string());
        state.marks.push("responsePart");

        state.start_stream(StreamIdentity {
            stream_sid: "MZ1".to_string(),
            call_sid: "CA1".to_string(),
            account_sid: "AC1".to_string(),
        });

        assert_eq!(state.timing.latest_media_timestamp_ms, 0);
        assert_eq!(state.timing.response_start_ms, None);
        assert_eq!(state.timing.last_assistant_item, None);
        assert!(state.marks.is_empty());
        assert_eq!(state.stream.as_ref().unwrap().stream_sid, "MZ1");
    }
}
