use async_trait::async_trait;

use super::{MemePlan, SearchPlan};
use crate::captions::LocalCaptions;
use crate::fallback::{Strategy, StrategyError};
use crate::providers::{GrokClient, OpenAiClient, parse_loose_json};

const SEARCH_SYSTEM: &str = "You turn user context into generic meme template search queries. \
Output clean, safe keywords (no brands or celebrities).";

const MEME_SYSTEM: &str = "You are a meme planner. Given a user context, produce:\n\
1) image_prompt: a safe, original visual description with no text in the image, no brand names, \
no logos, no celebrities and no explicit content, leaving clean space at the top and bottom for text.\n\
2) captions: 3-5 short, funny meme captions with clean humor.\n\
Return strict JSON with keys image_prompt and captions.";

fn search_user_prompt(context: &str) -> String {
    format!(
        "Context: {context}\nReturn JSON only:\n\
         {{\"search_prompt\": \"short phrase to search templates\", \"tags\": [\"upset\", \"office\", \"tired\"]}}"
    )
}

fn meme_user_prompt(context: &str) -> String {
    format!(
        "Context: {context}\nRespond only with JSON in this schema: \
         {{\"image_prompt\": \"...\", \"captions\": [\"TOP // BOTTOM\", \"single line\"]}}"
    )
}

fn meme_plan_from_reply(raw: &str) -> Result<MemePlan, StrategyError> {
    let value = parse_loose_json(raw).ok_or_else(|| StrategyError::malformed("planner returned non-JSON"))?;
    MemePlan::from_json(&value).ok_or_else(|| StrategyError::malformed("planner missing image_prompt"))
}

pub struct OpenAiSearchPlan {
    client: OpenAiClient,
}

impl OpenAiSearchPlan {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Strategy<String, SearchPlan> for OpenAiSearchPlan {
    fn name(&self) -> &str {
        "openai"
    }

    async fn invoke(&self, input: &String) -> Result<SearchPlan, StrategyError> {
        let raw = self
            .client
            .chat(SEARCH_SYSTEM, &search_user_prompt(input), 0.6)
            .await?;
        let value = parse_loose_json(&raw).unwrap_or(serde_json::Value::Null);
        Ok(SearchPlan::from_json(&value, input))
    }
}

/// The context itself as the query.
pub struct LocalSearchPlan;

#[async_trait]
impl Strategy<String, SearchPlan> for LocalSearchPlan {
    fn name(&self) -> &str {
        "local"
    }

    async fn invoke(&self, input: &String) -> Result<SearchPlan, StrategyError> {
        Ok(SearchPlan::literal(input))
    }
}

pub struct OpenAiMemePlan {
    client: OpenAiClient,
}

impl OpenAiMemePlan {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Strategy<String, MemePlan> for OpenAiMemePlan {
    fn name(&self) -> &str {
        "openai"
    }

    async fn invoke(&self, input: &String) -> Result<MemePlan, StrategyError> {
        let raw = self.client.chat(MEME_SYSTEM, &meme_user_prompt(input), 0.8).await?;
        meme_plan_from_reply(&raw)
    }
}

pub struct GrokMemePlan {
    client: GrokClient,
}

impl GrokMemePlan {
    pub fn new(client: GrokClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Strategy<String, MemePlan> for GrokMemePlan {
    fn name(&self) -> &str {
        "grok"
    }

    async fn invoke(&self, input: &String) -> Result<MemePlan, StrategyError> {
        let raw = self.client.chat(MEME_SYSTEM, &meme_user_prompt(input)).await?;
        meme_plan_from_reply(&raw)
    }
}

/// Generic background plus local caption templates.
pub struct LocalMemePlan;

impl LocalMemePlan {
    pub fn plan(context: &str) -> MemePlan {
        MemePlan {
            image_prompt: "A simple, memeable background with clear space at the top and bottom for text."
                .to_string(),
            captions: LocalCaptions::captions_for(context)
                .into_iter()
                .take(3)
                .map(|c| c.joined())
                .collect(),
        }
    }
}

#[async_trait]
impl Strategy<String, MemePlan> for LocalMemePlan {
    fn name(&self) -> &str {
        "local"
    }

    async fn invoke(&self, input: &String) -> Result<MemePlan, StrategyError> {
        Ok(Self::plan(input))
    }
}
