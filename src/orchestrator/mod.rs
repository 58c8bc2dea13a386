//! One long-lived orchestrator per process.
//!
//! It owns every agent plus [`OrchestratorState`], the rotation counter and the
//! template cache, behind a single `parking_lot` mutex. The lock is taken for
//! plain reads and writes only and is never held across an await point.

mod error;
mod types;

#[cfg(test)]
mod tests;

pub use error::OrchestratorError;
pub use types::{CaptionSuggestions, OrchestratorState, TemplateSearch};

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::captions::{Caption, CaptionAgent, CaptionRequest};
use crate::compliance::{ComplianceChain, ComplianceVerdict, standard_chain};
use crate::config::Config;
use crate::embedding::{CachedEmbedder, LexicalEmbedder, OpenAiEmbedder};
use crate::generator::{GenerateRequest, GeneratedMeme, ImageGenerator};
use crate::ideas::{Idea, IdeaAgent};
use crate::planner::{MemePlan, Planner};
use crate::providers::{
    DeepAiClient, GrokClient, HuggingFaceClient, OpenAiClient, PerspectiveClient, http_client,
};
use crate::ranking::{ScoredCandidate, TemplateRanker};
use crate::templates::{Candidate, ImgflipSource, MemegenSource, RedditSource, TemplatePool};

/// Agents and settings an [`Orchestrator`] is assembled from.
pub struct OrchestratorParts {
    pub ideas: IdeaAgent,
    pub templates: TemplatePool,
    pub ranker: TemplateRanker,
    pub captions: CaptionAgent,
    pub generator: ImageGenerator,
    pub planner: Planner,
    pub compliance: ComplianceChain,
    pub template_ttl: Duration,
    pub top_k: usize,
}

pub struct Orchestrator {
    state: Mutex<OrchestratorState>,
    ideas: IdeaAgent,
    templates: TemplatePool,
    ranker: TemplateRanker,
    captions: CaptionAgent,
    generator: ImageGenerator,
    planner: Planner,
    compliance: ComplianceChain,
    template_ttl: Duration,
    top_k: usize,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("ideas", &self.ideas.source_names())
            .field("templates", &self.templates)
            .field("generator", &self.generator)
            .field("compliance", &self.compliance)
            .field("template_ttl", &self.template_ttl)
            .field("top_k", &self.top_k)
            .finish()
    }
}

impl Orchestrator {
    pub fn new(parts: OrchestratorParts) -> Self {
        Self {
            state: Mutex::new(OrchestratorState::default()),
            ideas: parts.ideas,
            templates: parts.templates,
            ranker: parts.ranker,
            captions: parts.captions,
            generator: parts.generator,
            planner: parts.planner,
            compliance: parts.compliance,
            template_ttl: parts.template_ttl,
            top_k: parts.top_k,
        }
    }

    /// Wires every agent against the real providers described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, OrchestratorError> {
        let http = http_client(config.http_timeout)?;
        let openai = OpenAiClient::from_config(config, http_client(config.openai_timeout)?);
        let huggingface = HuggingFaceClient::from_config(config, http.clone());
        let deepai = DeepAiClient::new(http.clone(), config.deepai_api_key.clone());
        let perspective = PerspectiveClient::new(http.clone(), config.perspective_api_key.clone());
        let grok = GrokClient::new(config.grok_model.clone(), config.grok_enabled);

        let templates = TemplatePool::new(config.http_timeout)
            .with_source(ImgflipSource::new(http.clone()))
            .with_source(RedditSource::new(http.clone()))
            .with_source(MemegenSource::new(http.clone()));

        let ranker = TemplateRanker::with_providers(
            Arc::new(CachedEmbedder::new(OpenAiEmbedder::new(openai.clone()))),
            Arc::new(LexicalEmbedder::default()),
        );

        let compliance = standard_chain(config, openai.clone(), huggingface.clone(), perspective)?;

        info!(
            paid = config.use_paid_api,
            openai = openai.is_configured(),
            grok = config.grok_enabled,
            backends = ?config.image_backends,
            "Agents configured"
        );

        Ok(Self::new(OrchestratorParts {
            ideas: IdeaAgent::new(http.clone()),
            templates,
            ranker,
            captions: CaptionAgent::new(openai.clone(), huggingface, deepai),
            generator: ImageGenerator::from_config(config, http, openai.clone()),
            planner: Planner::new(openai, grok),
            compliance,
            template_ttl: config.template_cache_ttl,
            top_k: config.top_k,
        }))
    }

    pub fn idea_source_count(&self) -> usize {
        self.ideas.source_count()
    }

    pub fn default_top_k(&self) -> usize {
        self.top_k
    }

    /// One idea, starting from the next source in rotation.
    #[tracing::instrument(skip(self))]
    pub async fn get_idea(&self) -> Idea {
        let offset = self
            .state
            .lock()
            .idea_rotation
            .advance(self.ideas.source_count());
        self.ideas.get_idea(offset).await.value
    }

    /// Candidate pool, served from cache while it is younger than the TTL.
    ///
    /// Concurrent refreshes after expiry may each fetch; the last store wins.
    pub async fn templates(&self) -> Arc<Vec<Candidate>> {
        let cached = self
            .state
            .lock()
            .template_cache
            .get(Instant::now(), self.template_ttl);
        if let Some(pool) = cached {
            debug!(size = pool.len(), "Template cache hit");
            return pool;
        }

        let pool = Arc::new(self.templates.load().await);
        self.state
            .lock()
            .template_cache
            .store(Arc::clone(&pool), Instant::now());
        info!(size = pool.len(), "Template pool refreshed");
        pool
    }

    /// Drops the cached pool so the next call refetches.
    pub fn invalidate_templates(&self) {
        self.state.lock().template_cache.clear();
    }

    /// Templates ranked against `prompt`; `k` defaults to the configured top-k.
    #[tracing::instrument(skip(self, tags))]
    pub async fn get_templates(
        &self,
        prompt: &str,
        k: Option<usize>,
        tags: &[String],
    ) -> Result<Vec<ScoredCandidate>, OrchestratorError> {
        let pool = self.templates().await;
        let ranked = self
            .ranker
            .rank(prompt, &pool, tags, k.unwrap_or(self.top_k))
            .await?;
        Ok(ranked)
    }

    /// Plans a search from free-form context, then ranks with its prompt and tags.
    #[tracing::instrument(skip(self))]
    pub async fn search_templates(
        &self,
        context: &str,
        k: Option<usize>,
    ) -> Result<TemplateSearch, OrchestratorError> {
        let plan = self.planner.plan_search(context).await.value;
        let templates = self
            .get_templates(&plan.search_prompt, k, &plan.tags)
            .await?;
        Ok(TemplateSearch { plan, templates })
    }

    #[tracing::instrument(skip(self))]
    pub async fn suggest_captions(&self, prompt: &str, template: Option<String>) -> CaptionSuggestions {
        let outcome = self
            .captions
            .suggest(&CaptionRequest::new(prompt, template))
            .await;
        CaptionSuggestions {
            source: outcome.source.as_str().to_string(),
            captions: outcome.value,
        }
    }

    /// Runs compliance on the caption, then renders it.
    #[tracing::instrument(skip(self, request), fields(template_id = %request.template_id))]
    pub async fn generate_meme(
        &self,
        request: &GenerateRequest,
    ) -> Result<GeneratedMeme, OrchestratorError> {
        let caption = Caption::new(request.top_text.trim(), request.bottom_text.trim()).joined();
        let verdict = self.compliance.evaluate(&caption).await;
        if !verdict.passed {
            warn!(reason = %verdict.reason, "Generation refused");
            return Err(OrchestratorError::Blocked {
                reason: verdict.reason,
            });
        }

        Ok(self.generator.generate(request).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn plan_meme(&self, context: &str) -> MemePlan {
        self.planner.plan_meme(context).await.value
    }

    pub async fn check_caption(&self, caption: &str) -> ComplianceVerdict {
        self.compliance.evaluate(caption).await
    }
}
