pub mod call;
pub mod realtime;
pub mod telephony;

// Re-export commonly used types for convenience
pub use call::{AckQueue, CallState, PlaybackTiming, StreamIdentity};
pub use realtime::{ModelSession, RealtimeError, RealtimeResult};
pub use telephony::{CallFrame, TelephonyFrame, TwilioRelay};
