//! Tools the assistant can call during a conversation.

pub mod biography;

use async_trait::async_trait;

pub use biography::BiographyLookup;

/// Source of the document text backing a tool call.
///
/// `fetch` always resolves to usable text; implementations degrade to a
/// fallback string instead of surfacing transport errors, so the session
/// never leaves a tool call unanswered.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the document text.
    async fn fetch(&self) -> String;
}
