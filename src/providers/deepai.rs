//! DeepAI text generator.

use serde::Deserialize;

use super::error::ProviderError;
use super::read_json;

const PROVIDER: &str = "deepai";

pub const DEFAULT_DEEPAI_URL: &str = "https://api.deepai.org/api/text-generator";

#[derive(Clone)]
pub struct DeepAiClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for DeepAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepAiClient")
            .field("url", &self.url)
            .field("configured", &self.is_configured())
            .finish()
    }
}

#[derive(Deserialize)]
struct TextOutput {
    output: Option<String>,
}

impl DeepAiClient {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            http,
            url: DEFAULT_DEEPAI_URL.to_string(),
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

    pub async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::Unconfigured { provider: PROVIDER })?;

        let response = self
            .http
            .post(&self.url)
            .header("api-key", key)
            .form(&[("text", prompt)])
            .send()
            .await
            .map_err(ProviderError::request(PROVIDER))?;
        let body: TextOutput = read_json(PROVIDER, response).await?;

        body.output
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "no output"))
    }
}
