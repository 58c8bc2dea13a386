//! HuggingFace hosted inference (text generation and text classification).

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::error::ProviderError;
use super::read_json;
use crate::config::Config;

const PROVIDER: &str = "huggingface";

/// Default hosted-inference root; the model id is appended as a path.
pub const DEFAULT_HUGGINGFACE_BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// One label of a classification response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

#[derive(Clone)]
pub struct HuggingFaceClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    caption_model: String,
    toxicity_model: String,
}

impl std::fmt::Debug for HuggingFaceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceClient")
            .field("base_url", &self.base_url)
            .field("configured", &self.is_configured())
            .field("caption_model", &self.caption_model)
            .field("toxicity_model", &self.toxicity_model)
            .finish()
    }
}

#[derive(Deserialize)]
struct Generated {
    generated_text: String,
}

impl HuggingFaceClient {
    pub fn new(http: reqwest::Client, token: Option<String>) -> Self {
        Self {
            http,
            base_url: DEFAULT_HUGGINGFACE_BASE_URL.to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            caption_model: "distilgpt2".to_string(),
            toxicity_model: "unitary/toxic-bert".to_string(),
        }
    }

    pub fn from_config(config: &Config, http: reqwest::Client) -> Self {
        Self::new(http, config.huggingface_api_token.clone()).with_models(
            &config.huggingface_caption_model,
            &config.huggingface_toxicity_model,
        )
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_models(mut self, caption: &str, toxicity: &str) -> Self {
        self.caption_model = caption.to_string();
        self.toxicity_model = toxicity.to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    async fn post(&self, model: &str, body: &Value) -> Result<reqwest::Response, ProviderError> {
        let token = self
            .token
            .as_deref()
            .ok_or(ProviderError::Unconfigured { provider: PROVIDER })?;
        self.http
            .post(format!("{}/{}", self.base_url, model))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(ProviderError::request(PROVIDER))
    }

    /// Continues `prompt` with the caption model; returns only the new text.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = json!({
            "inputs": prompt,
            "parameters": { "max_new_tokens": 40, "return_full_text": false },
        });
        let response = self.post(&self.caption_model, &body).await?;
        let generated: Vec<Generated> = read_json(PROVIDER, response).await?;

        generated
            .into_iter()
            .map(|g| g.generated_text.trim().to_string())
            .find(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "no generated_text"))
    }

    /// Classifies `text` with the toxicity model.
    ///
    /// The API answers either `[[{label, score}]]` or `[{label, score}]`.
    pub async fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ProviderError> {
        let response = self
            .post(&self.toxicity_model, &json!({ "inputs": text }))
            .await?;
        let body: Value = read_json(PROVIDER, response).await?;

        let nested = matches!(
            body.as_array().and_then(|outer| outer.first()),
            Some(Value::Array(_))
        );
        let rows = if nested { body[0].clone() } else { body };
        if rows.as_array().is_none_or(|r| r.is_empty()) {
            return Err(ProviderError::malformed(PROVIDER, "empty classification"));
        }
        serde_json::from_value(rows).map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))
    }
}
