//! Outbound clients for the third-party APIs the agents depend on.
//!
//! Each client is a thin typed wrapper: it builds the request, enforces the
//! configured timeout through the shared [`reqwest::Client`], checks the status
//! and extracts the one field the agents care about. Clients never decide what
//! to do on failure; they return [`ProviderError`] and the calling strategy or
//! checker maps it.

pub mod deepai;
pub mod error;
pub mod grok;
pub mod huggingface;
pub mod openai;
pub mod perspective;


pub use deepai::DeepAiClient;
pub use error::ProviderError;
pub use grok::GrokClient;
pub use huggingface::{HuggingFaceClient, LabelScore};
pub use openai::OpenAiClient;
pub use perspective::PerspectiveClient;

use std::time::Duration;

use serde::de::DeserializeOwned;

/// Builds the shared HTTP client with a per-request timeout.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("memeforge/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Checks the status of `response` and decodes its JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Malformed {
            provider,
            reason: e.to_string(),
        })
}

/// Extracts the first `{ ... }` block from a model reply and parses it.
///
/// Chat models often wrap JSON in prose or code fences.
pub fn parse_loose_json(raw: &str) -> Option<serde_json::Value> {
    let trimmed = raw.trim().trim_matches('`').trim();
    let trimmed = trimmed.strip_prefix("json").unwrap_or(trimmed).trim();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return Some(value);
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}
