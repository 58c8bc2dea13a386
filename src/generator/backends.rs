//! One strategy per [`ImageBackend`]. Each returns the meme URL or file path.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::render::render_svg;
use super::types::GenerateRequest;
use crate::fallback::{Strategy, StrategyError};
use crate::providers::OpenAiClient;
use crate::templates::{IMGFLIP_API_URL, MEMEGEN_API_URL, static_fallback};

async fn write_output(dir: &Path, extension: &str, bytes: &[u8]) -> Result<PathBuf, StrategyError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| StrategyError::malformed(format!("cannot create {}: {e}", dir.display())))?;
    let path = dir.join(format!("meme_{}.{extension}", uuid::Uuid::new_v4()));
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| StrategyError::malformed(format!("cannot write {}: {e}", path.display())))?;
    Ok(path)
}

#[derive(Deserialize)]
struct ImgflipCaptionResponse {
    #[serde(default)]
    success: bool,
    data: Option<ImgflipCaptionData>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct ImgflipCaptionData {
    url: String,
}

/// Imgflip `caption_image`; numeric template ids and credentials only.
#[derive(Debug, Clone)]
pub struct ImgflipBackend {
    http: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl ImgflipBackend {
    pub fn new(http: reqwest::Client, username: Option<String>, password: Option<String>) -> Self {
        Self {
            http,
            base_url: IMGFLIP_API_URL.to_string(),
            username,
            password,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Strategy<GenerateRequest, String> for ImgflipBackend {
    fn name(&self) -> &str {
        "imgflip"
    }

    async fn invoke(&self, input: &GenerateRequest) -> Result<String, StrategyError> {
        if input.template_id.is_empty() || !input.template_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(StrategyError::unavailable("template id is not an Imgflip id"));
        }
        let (username, password) = match (&self.username, &self.password) {
            (Some(u), Some(p)) => (u, p),
            _ => return Err(StrategyError::unavailable("imgflip credentials not configured")),
        };

        let form = [
            ("template_id", input.template_id.as_str()),
            ("username", username.as_str()),
            ("password", password.as_str()),
            ("text0", input.top_text.as_str()),
            ("text1", input.bottom_text.as_str()),
        ];
        let response = self
            .http
            .post(format!("{}/caption_image", self.base_url))
            .form(&form)
            .send()
            .await
            .map_err(|e| StrategyError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StrategyError::Status {
                status: status.as_u16(),
            });
        }
        let body: ImgflipCaptionResponse = response
            .json()
            .await
            .map_err(|e| StrategyError::malformed(e.to_string()))?;

        match body.data {
            Some(data) if body.success && !data.url.is_empty() => Ok(data.url),
            _ => Err(StrategyError::malformed(
                body.error_message
                    .unwrap_or_else(|| "caption_image returned no url".to_string()),
            )),
        }
    }
}

/// Memegen URL builder for `memegen:<slug>` and `memegen_ex:<background-url>` ids.
#[derive(Debug, Clone)]
pub struct MemegenBackend {
    base_url: String,
}

impl Default for MemegenBackend {
    fn default() -> Self {
        Self {
            base_url: MEMEGEN_API_URL.to_string(),
        }
    }
}

impl MemegenBackend {
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Blank lines become `_`; spaces become `_`; everything else is percent-encoded.
    pub fn encode_line(text: &str) -> String {
        let text = text.trim();
        if text.is_empty() {
            return "_".to_string();
        }
        urlencoding::encode(text).replace("%20", "_")
    }

    pub fn url_for(&self, request: &GenerateRequest) -> Option<String> {
        let top = Self::encode_line(&request.top_text);
        let bottom = Self::encode_line(&request.bottom_text);

        if let Some(slug) = request.template_id.strip_prefix("memegen:") {
            if slug.is_empty() {
                return None;
            }
            return Some(format!("{}/images/{slug}/{top}/{bottom}.png", self.base_url));
        }
        if let Some(background) = request.template_id.strip_prefix("memegen_ex:") {
            if background.is_empty() {
                return None;
            }
            return Some(format!(
                "{}/images/custom/{top}/{bottom}.png?background={}",
                self.base_url,
                urlencoding::encode(background)
            ));
        }
        None
    }
}

#[async_trait]
impl Strategy<GenerateRequest, String> for MemegenBackend {
    fn name(&self) -> &str {
        "memegen"
    }

    async fn invoke(&self, input: &GenerateRequest) -> Result<String, StrategyError> {
        self.url_for(input)
            .ok_or_else(|| StrategyError::unavailable("template id is not a memegen id"))
    }
}

/// Picks a template image for the local overlay: explicit URL, then a known
/// template id, then a keyword match on the caption, then the first default.
pub fn resolve_template_image(request: &GenerateRequest) -> String {
    if let Some(url) = request.template_url.as_deref().filter(|u| !u.trim().is_empty()) {
        return url.to_string();
    }

    let defaults = static_fallback();
    if let Some(known) = defaults.iter().find(|c| c.id == request.template_id) {
        return known.url.clone();
    }

    let text = format!("{} {}", request.top_text, request.bottom_text).to_lowercase();
    let keyword_id = [
        ("choice", "181913649"),
        ("approve", "181913649"),
        ("distract", "112126428"),
        ("compare", "112126428"),
    ]
    .iter()
    .find(|(keyword, _)| text.contains(keyword))
    .map(|(_, id)| *id);

    defaults
        .iter()
        .find(|c| Some(c.id.as_str()) == keyword_id)
        .or_else(|| defaults.first())
        .map(|c| c.url.clone())
        .unwrap_or_default()
}

/// Writes an SVG overlay to the output directory. Always available.
#[derive(Debug, Clone)]
pub struct LocalOverlayBackend {
    output_dir: PathBuf,
}

impl LocalOverlayBackend {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl Strategy<GenerateRequest, String> for LocalOverlayBackend {
    fn name(&self) -> &str {
        "local"
    }

    async fn invoke(&self, input: &GenerateRequest) -> Result<String, StrategyError> {
        let image = resolve_template_image(input);
        let svg = render_svg(&image, &input.top_text, &input.bottom_text);
        let path = write_output(&self.output_dir, "svg", svg.as_bytes()).await?;
        debug!(path = %path.display(), "Wrote overlay");
        Ok(path.display().to_string())
    }
}

/// OpenAI image generation; the caption is overlaid on the generated background.
#[derive(Debug, Clone)]
pub struct OpenAiImageBackend {
    client: OpenAiClient,
    output_dir: PathBuf,
}

impl OpenAiImageBackend {
    pub fn new(client: OpenAiClient, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            output_dir: output_dir.into(),
        }
    }

    pub fn image_prompt(request: &GenerateRequest) -> String {
        format!(
            "A safe, original meme background for the caption \"{}\" / \"{}\". \
             No text, logos, brands or real people in the image. Leave clean space at the top and bottom.",
            request.top_text.trim(),
            request.bottom_text.trim()
        )
    }
}

#[async_trait]
impl Strategy<GenerateRequest, String> for OpenAiImageBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn invoke(&self, input: &GenerateRequest) -> Result<String, StrategyError> {
        if !self.client.is_configured() {
            return Err(StrategyError::unavailable("openai is not configured"));
        }
        let png = self.client.generate_image(&Self::image_prompt(input)).await?;
        let background = write_output(&self.output_dir, "png", &png).await?;

        let href = background
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| background.display().to_string());
        let svg = render_svg(&href, &input.top_text, &input.bottom_text);
        let path = write_output(&self.output_dir, "svg", svg.as_bytes()).await?;
        Ok(path.display().to_string())
    }
}
