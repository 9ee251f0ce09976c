//! Caller-facing side of the bridge: Twilio Media Streams frames and the
//! relay that speaks them.

pub mod messages;
pub mod relay;

pub use messages::{CallFrame, TelephonyFrame};
pub use relay::TwilioRelay;
