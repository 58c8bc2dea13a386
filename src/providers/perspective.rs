//! Google Perspective comment analysis (TOXICITY attribute only).

use serde_json::{Value, json};

use super::error::ProviderError;
use super::read_json;

const PROVIDER: &str = "perspective";

pub const DEFAULT_PERSPECTIVE_URL: &str =
    "https://commentanalyzer.googleapis.com/v1alpha1/comments:analyze";

#[derive(Clone)]
pub struct PerspectiveClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for PerspectiveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerspectiveClient")
            .field("url", &self.url)
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl PerspectiveClient {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            http,
            url: DEFAULT_PERSPECTIVE_URL.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Returns the TOXICITY summary score in `[0, 1]`.
    pub async fn toxicity(&self, text: &str) -> Result<f32, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::Unconfigured { provider: PROVIDER })?;

        let response = self
            .http
            .post(&self.url)
            .query(&[("key", key)])
            .json(&json!({
                "comment": { "text": text },
                "languages": ["en"],
                "requestedAttributes": { "TOXICITY": {} },
                "doNotStore": true,
            }))
            .send()
            .await
            .map_err(ProviderError::request(PROVIDER))?;
        let body: Value = read_json(PROVIDER, response).await?;

        body.pointer("/attributeScores/TOXICITY/summaryScore/value")
            .and_then(Value::as_f64)
            .map(|v| v as f32)
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "missing TOXICITY summaryScore"))
    }
}
