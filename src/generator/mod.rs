//! Image generation across a closed set of backends.
//!
//! Backends are registered per [`ImageBackend`] and walked in the configured
//! order; a request naming a backend moves it to the front. Exhaustion is an
//! error, never a guessed image.

mod backends;
mod error;
mod render;
mod types;


pub use backends::{
    ImgflipBackend, LocalOverlayBackend, MemegenBackend, OpenAiImageBackend,
    resolve_template_image,
};
pub use error::GeneratorError;
pub use render::render_svg;
pub use types::{GenerateRequest, GeneratedMeme, ImageBackend};

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::fallback::{FallbackChain, Strategy};
use crate::providers::OpenAiClient;

type BackendStrategy = Arc<dyn Strategy<GenerateRequest, String>>;

#[derive(Clone)]
pub struct ImageGenerator {
    backends: HashMap<ImageBackend, BackendStrategy>,
    order: Vec<ImageBackend>,
}

impl std::fmt::Debug for ImageGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageGenerator")
            .field("order", &self.order)
            .finish()
    }
}

impl ImageGenerator {
    /// Creates a generator with no registered backends.
    pub fn new(order: Vec<ImageBackend>) -> Self {
        Self {
            backends: HashMap::new(),
            order,
        }
    }

    /// Registers all four backends from configuration.
    pub fn from_config(config: &Config, http: reqwest::Client, openai: OpenAiClient) -> Self {
        Self::new(config.image_backends.clone())
            .with_backend(
                ImageBackend::Imgflip,
                ImgflipBackend::new(
                    http,
                    config.imgflip_username.clone(),
                    config.imgflip_password.clone(),
                ),
            )
            .with_backend(
                ImageBackend::OpenAi,
                OpenAiImageBackend::new(openai, config.output_dir.clone()),
            )
            .with_backend(ImageBackend::Memegen, MemegenBackend::default())
            .with_backend(
                ImageBackend::Local,
                LocalOverlayBackend::new(config.output_dir.clone()),
            )
    }

    pub fn with_backend(
        mut self,
        backend: ImageBackend,
        strategy: impl Strategy<GenerateRequest, String> + 'static,
    ) -> Self {
        self.backends.insert(backend, Arc::new(strategy));
        self
    }

    pub fn order(&self) -> &[ImageBackend] {
        &self.order
    }

    /// Configured order with the request's preferred backend moved first.
    pub fn order_for(&self, request: &GenerateRequest) -> Result<Vec<ImageBackend>, GeneratorError> {
        let preferred = match request.backend.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => Some(name.parse::<ImageBackend>().map_err(|_| {
                GeneratorError::UnknownBackend {
                    value: name.to_string(),
                }
            })?),
        };

        let mut order = self.order.clone();
        if let Some(first) = preferred {
            order.retain(|b| *b != first);
            order.insert(0, first);
        }
        Ok(order)
    }

    #[tracing::instrument(skip(self, request), fields(template_id = %request.template_id))]
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedMeme, GeneratorError> {
        if request.template_id.trim().is_empty() {
            return Err(GeneratorError::MissingTemplate);
        }

        let mut chain = FallbackChain::new("image").with_predicate(|url: &String| !url.trim().is_empty());
        for backend in self.order_for(request)? {
            if let Some(strategy) = self.backends.get(&backend) {
                chain.push(Arc::clone(strategy));
            }
        }

        let outcome = chain.try_execute(request, 0).await?;
        info!(backend = %outcome.source, attempts = outcome.attempts(), "Meme generated");
        let backend = outcome.source.as_str().to_string();
        Ok(GeneratedMeme {
            meme_url: outcome.value,
            backend,
        })
    }
}
