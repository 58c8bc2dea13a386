//! Turns free-form user context into a template search or a full meme plan.
//!
//! Both plans go through a fallback chain ending in a local plan, so planning
//! never fails. Chat replies are parsed with loose JSON recovery.

mod strategies;


pub use strategies::{GrokMemePlan, LocalMemePlan, LocalSearchPlan, OpenAiMemePlan, OpenAiSearchPlan};

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::constants::{MAX_PLANNER_TAGS, MAX_SEARCH_PROMPT_CHARS};
use crate::fallback::{ExecutionOutcome, FallbackChain};
use crate::providers::{GrokClient, OpenAiClient};

/// Most captions kept from a meme plan.
pub const MAX_PLAN_CAPTIONS: usize = 5;

/// Template search query derived from context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPlan {
    pub search_prompt: String,
    pub tags: Vec<String>,
}

impl SearchPlan {
    /// Plan that searches for the context verbatim with no tags.
    pub fn literal(context: &str) -> Self {
        Self {
            search_prompt: truncate_chars(context.trim(), MAX_SEARCH_PROMPT_CHARS),
            tags: Vec::new(),
        }
    }

    /// Reads `{search_prompt, tags}`; a missing prompt falls back to `context`.
    pub fn from_json(value: &Value, context: &str) -> Self {
        let prompt = value
            .get("search_prompt")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| context.trim());

        let mut tags: Vec<String> = Vec::new();
        for tag in value
            .get("tags")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
        {
            let tag = tag.trim().to_lowercase();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
            if tags.len() == MAX_PLANNER_TAGS {
                break;
            }
        }

        Self {
            search_prompt: truncate_chars(prompt, MAX_SEARCH_PROMPT_CHARS),
            tags,
        }
    }
}

/// Image prompt plus candidate captions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemePlan {
    pub image_prompt: String,
    pub captions: Vec<String>,
}

impl MemePlan {
    /// Reads `{image_prompt, captions}`. A missing image prompt is an error; no
    /// captions is filled with generic ones.
    pub fn from_json(value: &Value) -> Option<Self> {
        let image_prompt = value
            .get("image_prompt")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())?
            .to_string();

        let mut captions: Vec<String> = value
            .get("captions")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .take(MAX_PLAN_CAPTIONS)
            .collect();

        if captions.is_empty() {
            captions = ["WHEN THE CONTEXT HITS", "POV: MONDAY ENERGY", "RELATABLE // CHAOS MODE"]
                .iter()
                .map(|s| s.to_string())
                .collect();
        }

        Some(Self {
            image_prompt,
            captions,
        })
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[derive(Debug, Clone)]
pub struct Planner {
    search: FallbackChain<String, SearchPlan>,
    meme: FallbackChain<String, MemePlan>,
}

impl Planner {
    pub fn new(openai: OpenAiClient, grok: GrokClient) -> Self {
        Self::from_chains(
            FallbackChain::new("search_plan")
                .with_strategy(OpenAiSearchPlan::new(openai.clone()))
                .with_strategy(LocalSearchPlan),
            FallbackChain::new("meme_plan")
                .with_strategy(OpenAiMemePlan::new(openai))
                .with_strategy(GrokMemePlan::new(grok))
                .with_strategy(LocalMemePlan),
        )
    }

    pub fn from_chains(
        search: FallbackChain<String, SearchPlan>,
        meme: FallbackChain<String, MemePlan>,
    ) -> Self {
        Self {
            search: search.with_predicate(|plan: &SearchPlan| !plan.search_prompt.is_empty()),
            meme: meme.with_predicate(|plan: &MemePlan| {
                !plan.image_prompt.is_empty() && !plan.captions.is_empty()
            }),
        }
    }

    /// Search query and tags for `context`.
    pub async fn plan_search(&self, context: &str) -> ExecutionOutcome<SearchPlan> {
        let context = context.trim().to_string();
        let outcome = self
            .search
            .execute(&context, 0, SearchPlan::literal(&context))
            .await;
        info!(source = %outcome.source, tags = outcome.value.tags.len(), "Search planned");
        outcome
    }

    /// Image prompt and captions for `context`.
    pub async fn plan_meme(&self, context: &str) -> ExecutionOutcome<MemePlan> {
        let context = context.trim().to_string();
        let fallback = LocalMemePlan::plan(&context);
        let outcome = self.meme.execute(&context, 0, fallback).await;
        info!(source = %outcome.source, captions = outcome.value.captions.len(), "Meme planned");
        outcome
    }
}
