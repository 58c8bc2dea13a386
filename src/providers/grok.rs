//! xAI Grok chat through `genai`.
//!
//! `genai` resolves `grok-*` model names to the xAI adapter and reads
//! `XAI_API_KEY` itself; we only track whether the key is present so an
//! unconfigured client fails fast without a network round trip.

use genai::Client;
use genai::chat::{ChatMessage, ChatRequest};
use tracing::debug;

use super::error::ProviderError;

const PROVIDER: &str = "grok";

pub const DEFAULT_GROK_MODEL: &str = "grok-2-latest";

#[derive(Clone)]
pub struct GrokClient {
    client: Client,
    model: String,
    enabled: bool,
}

impl std::fmt::Debug for GrokClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrokClient")
            .field("model", &self.model)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl GrokClient {
    pub fn new(model: impl Into<String>, enabled: bool) -> Self {
        Self {
            client: Client::default(),
            model: model.into(),
            enabled,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.enabled
    }

    pub async fn chat(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::Unconfigured { provider: PROVIDER });
        }

        let request = ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(user)]);
        debug!(model = %self.model, "Grok chat request");

        let response = self
            .client
            .exec_chat(&self.model, request, None)
            .await
            .map_err(|e| ProviderError::Client {
                provider: PROVIDER,
                reason: e.to_string(),
            })?;

        response
            .first_text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "empty completion"))
    }
}
