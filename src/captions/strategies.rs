//! Caption strategies: OpenAI, HuggingFace, DeepAI and local templates.

use async_trait::async_trait;

use super::types::{Caption, CaptionRequest, parse_caption_lines};
use crate::fallback::{Strategy, StrategyError};
use crate::providers::{DeepAiClient, HuggingFaceClient, OpenAiClient};

const MAX_CAPTIONS: usize = 5;

const SYSTEM_PROMPT: &str = "You write short, clean, funny meme captions. \
Reply with 4 captions, one per line, each formatted as TOP TEXT // BOTTOM TEXT. \
No numbering, no commentary, no slurs or NSFW content.";

pub struct OpenAiCaptions {
    client: OpenAiClient,
}

impl OpenAiCaptions {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Strategy<CaptionRequest, Vec<Caption>> for OpenAiCaptions {
    fn name(&self) -> &str {
        "openai"
    }

    async fn invoke(&self, input: &CaptionRequest) -> Result<Vec<Caption>, StrategyError> {
        let raw = self.client.chat(SYSTEM_PROMPT, &input.instruction(), 0.9).await?;
        Ok(parse_caption_lines(&raw, MAX_CAPTIONS))
    }
}

pub struct HuggingFaceCaptions {
    client: HuggingFaceClient,
}

impl HuggingFaceCaptions {
    pub fn new(client: HuggingFaceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Strategy<CaptionRequest, Vec<Caption>> for HuggingFaceCaptions {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn invoke(&self, input: &CaptionRequest) -> Result<Vec<Caption>, StrategyError> {
        let prompt = format!("Meme caption about {}:", input.prompt);
        let raw = self.client.generate_text(&prompt).await?;
        Ok(parse_caption_lines(&raw, MAX_CAPTIONS))
    }
}

pub struct DeepAiCaptions {
    client: DeepAiClient,
}

impl DeepAiCaptions {
    pub fn new(client: DeepAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Strategy<CaptionRequest, Vec<Caption>> for DeepAiCaptions {
    fn name(&self) -> &str {
        "deepai"
    }

    async fn invoke(&self, input: &CaptionRequest) -> Result<Vec<Caption>, StrategyError> {
        let raw = self.client.generate_text(&input.instruction()).await?;
        Ok(parse_caption_lines(&raw, MAX_CAPTIONS))
    }
}

const LOCAL_TEMPLATES: &[&str] = &[
    "POV: {} // it escalated quickly",
    "me: {} // also me: panic",
    "when {} // hits different",
    "{} // nobody: absolutely nobody",
    "{}? // in this economy?",
];

/// Fills fixed caption templates with the prompt. Always answers.
#[derive(Debug, Default, Clone)]
pub struct LocalCaptions;

impl LocalCaptions {
    pub fn captions_for(prompt: &str) -> Vec<Caption> {
        let topic = prompt.trim();
        let topic = if topic.is_empty() { "this" } else { topic };
        LOCAL_TEMPLATES
            .iter()
            .map(|template| Caption::parse(&template.replace("{}", topic)))
            .collect()
    }
}

#[async_trait]
impl Strategy<CaptionRequest, Vec<Caption>> for LocalCaptions {
    fn name(&self) -> &str {
        "local"
    }

    async fn invoke(&self, input: &CaptionRequest) -> Result<Vec<Caption>, StrategyError> {
        Ok(Self::captions_for(&input.prompt))
    }
}
