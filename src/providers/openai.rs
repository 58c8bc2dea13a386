//! OpenAI chat, embeddings, moderation and image generation.
//!
//! Chat requests are built with the `async-openai` request types and sent over
//! the shared `reqwest` client so every call honours the same timeout policy.

use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    CreateChatCompletionResponse,
};
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::error::ProviderError;
use super::read_json;
use crate::config::Config;

const PROVIDER: &str = "openai";

/// Default API root.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Moderation model used by the compliance chain.
pub const OPENAI_MODERATION_MODEL: &str = "omni-moderation-latest";
/// Image size requested from the image endpoint.
pub const OPENAI_IMAGE_SIZE: &str = "1024x1024";

/// Thin client over the OpenAI REST API.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    text_model: String,
    image_model: String,
    embedding_model: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("configured", &self.is_configured())
            .field("text_model", &self.text_model)
            .finish()
    }
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ModerationResponse {
    results: Vec<ModerationResult>,
}

#[derive(Deserialize)]
struct ModerationResult {
    #[serde(default)]
    flagged: bool,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}

impl OpenAiClient {
    /// Creates a client. `api_key = None` leaves every call `Unconfigured`.
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            text_model: "gpt-4o-mini".to_string(),
            image_model: "gpt-image-1".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
        }
    }

    /// Builds the client from config; the key is dropped unless paid mode is on.
    pub fn from_config(config: &Config, http: reqwest::Client) -> Self {
        let key = if config.use_paid_api {
            config.openai_api_key.clone()
        } else {
            None
        };
        Self::new(http, key)
            .with_base_url(&config.openai_base_url)
            .with_models(
                &config.openai_text_model,
                &config.openai_image_model,
                &config.openai_embedding_model,
            )
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_models(mut self, text: &str, image: &str, embedding: &str) -> Self {
        self.text_model = text.to_string();
        self.image_model = image.to_string();
        self.embedding_model = embedding.to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or(ProviderError::Unconfigured { provider: PROVIDER })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Single-turn chat completion; returns the trimmed assistant text.
    pub async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        let key = self.api_key()?;

        let system_message = ChatCompletionRequestSystemMessageArgs::default()
            .content(system)
            .build()
            .map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))?;
        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(user)
            .build()
            .map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))?;
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.text_model.as_str())
            .messages([
                ChatCompletionRequestMessage::System(system_message),
                ChatCompletionRequestMessage::User(user_message),
            ])
            .temperature(temperature)
            .build()
            .map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))?;

        debug!(model = %self.text_model, "OpenAI chat request");
        let response = self
            .http
            .post(self.url("chat/completions"))
            .bearer_auth(key)
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::request(PROVIDER))?;
        let body: CreateChatCompletionResponse = read_json(PROVIDER, response).await?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "chat response had no content"))
    }

    /// Embeds `texts`, returning vectors in input order.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let key = self.api_key()?;
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .http
            .post(self.url("embeddings"))
            .bearer_auth(key)
            .json(&json!({ "model": self.embedding_model, "input": texts }))
            .send()
            .await
            .map_err(ProviderError::request(PROVIDER))?;
        let mut body: EmbeddingResponse = read_json(PROVIDER, response).await?;

        if body.data.len() != texts.len() {
            return Err(ProviderError::malformed(
                PROVIDER,
                format!("expected {} embeddings, got {}", texts.len(), body.data.len()),
            ));
        }
        body.data.sort_by_key(|d| d.index);
        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }

    /// Returns `true` when the moderation endpoint flags `text`.
    pub async fn moderate(&self, text: &str) -> Result<bool, ProviderError> {
        let key = self.api_key()?;

        let response = self
            .http
            .post(self.url("moderations"))
            .bearer_auth(key)
            .json(&json!({ "model": OPENAI_MODERATION_MODEL, "input": text }))
            .send()
            .await
            .map_err(ProviderError::request(PROVIDER))?;
        let body: ModerationResponse = read_json(PROVIDER, response).await?;

        Ok(body.results.iter().any(|r| r.flagged))
    }

    /// Generates one square image and returns the decoded PNG bytes.
    pub async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ProviderError> {
        let key = self.api_key()?;

        let response = self
            .http
            .post(self.url("images/generations"))
            .bearer_auth(key)
            .json(&json!({
                "model": self.image_model,
                "prompt": prompt,
                "size": OPENAI_IMAGE_SIZE,
            }))
            .send()
            .await
            .map_err(ProviderError::request(PROVIDER))?;
        let body: ImageResponse = read_json(PROVIDER, response).await?;

        let encoded = body
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "image response had no b64_json"))?;

        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))
    }
}
