use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// The closed set of image backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageBackend {
    Imgflip,
    OpenAi,
    Memegen,
    Local,
}

impl ImageBackend {
    pub const ALL: [ImageBackend; 4] = [
        ImageBackend::Imgflip,
        ImageBackend::OpenAi,
        ImageBackend::Memegen,
        ImageBackend::Local,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ImageBackend::Imgflip => "imgflip",
            ImageBackend::OpenAi => "openai",
            ImageBackend::Memegen => "memegen",
            ImageBackend::Local => "local",
        }
    }

    pub fn default_order() -> Vec<ImageBackend> {
        Self::ALL.to_vec()
    }

    /// Parses a comma-separated list, dropping repeats.
    pub fn parse_list(value: &str) -> Result<Vec<ImageBackend>, ConfigError> {
        let mut order = Vec::new();
        for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let backend: ImageBackend = name.parse()?;
            if !order.contains(&backend) {
                order.push(backend);
            }
        }
        if order.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "MEMEFORGE_IMAGE_BACKENDS",
                reason: "at least one backend is required".to_string(),
            });
        }
        Ok(order)
    }
}

impl FromStr for ImageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "imgflip" => Ok(ImageBackend::Imgflip),
            "openai" => Ok(ImageBackend::OpenAi),
            "memegen" => Ok(ImageBackend::Memegen),
            "local" | "overlay" => Ok(ImageBackend::Local),
            _ => Err(ConfigError::UnknownBackend {
                value: s.trim().to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ImageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a generate call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub template_id: String,
    #[serde(default)]
    pub top_text: String,
    #[serde(default)]
    pub bottom_text: String,
    /// Preferred backend, tried before the configured order.
    #[serde(default)]
    pub backend: Option<String>,
    /// Template image, used by the local overlay.
    #[serde(default)]
    pub template_url: Option<String>,
}

impl GenerateRequest {
    pub fn new(
        template_id: impl Into<String>,
        top_text: impl Into<String>,
        bottom_text: impl Into<String>,
    ) -> Self {
        Self {
            template_id: template_id.into(),
            top_text: top_text.into(),
            bottom_text: bottom_text.into(),
            ..Default::default()
        }
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    pub fn with_template_url(mut self, url: impl Into<String>) -> Self {
        self.template_url = Some(url.into());
        self
    }
}

/// A rendered meme and the backend that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedMeme {
    pub meme_url: String,
    pub backend: String,
}
