//! Biography lookup tool.
//!
//! The single tool declared to the model: on invocation the bridge fetches
//! a biography document from a configured endpoint and returns it as the
//! function call output.

use async_trait::async_trait;
use serde_json::json;

use super::DocumentSource;
use crate::core::realtime::openai::messages::ToolDef;

/// Function name declared to the model.
pub const FUNCTION_NAME: &str = "load_biography";

/// Returned when the lookup endpoint is unreachable or answers non-2xx.
pub const FALLBACK_TEXT: &str =
    "The biography service is currently unavailable. Please try again later.";

/// Tool schema advertised in the session configuration. Takes no arguments.
pub fn definition() -> ToolDef {
    ToolDef {
        tool_type: "function".to_string(),
        name: FUNCTION_NAME.to_string(),
        description: Some(
            "Vlad Krasovsky initial biography and summary if his personal and professions background"
                .to_string(),
        ),
        parameters: Some(json!({
            "type": "object",
            "properties": {}
        })),
    }
}

/// Fetches the biography document over HTTP.
pub struct BiographyLookup {
    client: reqwest::Client,
    endpoint: String,
}

impl BiographyLookup {
    /// Create a lookup against `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl DocumentSource for BiographyLookup {
    async fn fetch(&self) -> String {
        let response = match self.client.get(&self.endpoint).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Biography lookup failed: {}", e);
                return FALLBACK_TEXT.to_string();
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Biography lookup returned status {}", response.status());
            return FALLBACK_TEXT.to_string();
        }

        match response.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Biography lookup body unreadable: {}", e);
                FALLBACK_TEXT.to_string()
            }
        }
    }
}
