//! Orchestrator parts wired to every real client, pointed at [`FakeUpstream`].

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use memeforge::captions::CaptionAgent;
use memeforge::compliance::{
    BannedWordChecker, ComplianceChain, ComplianceLog, HuggingFaceToxicityChecker,
    OpenAiModerationChecker, PerspectiveChecker,
};
use memeforge::constants::{DEFAULT_TEMPLATE_CACHE_TTL, DEFAULT_TOP_K};
use memeforge::embedding::{CachedEmbedder, LexicalEmbedder, OpenAiEmbedder};
use memeforge::generator::{
    ImageBackend, ImageGenerator, ImgflipBackend, LocalOverlayBackend, MemegenBackend,
    OpenAiImageBackend,
};
use memeforge::ideas::{IdeaAgent, IdeaSource, IdeaStrategy};
use memeforge::orchestrator::OrchestratorParts;
use memeforge::planner::Planner;
use memeforge::providers::grok::DEFAULT_GROK_MODEL;
use memeforge::providers::{DeepAiClient, GrokClient, HuggingFaceClient, OpenAiClient, PerspectiveClient};
use memeforge::ranking::TemplateRanker;
use memeforge::templates::{ImgflipSource, MemegenSource, RedditSource, TemplatePool};

use super::fake_upstream::{FakeUpstream, IMGFLIP_PASS, IMGFLIP_USER};

pub const SOURCE_TIMEOUT: Duration = Duration::from_secs(1);

/// Clients configured with keys and aimed at the fake.
pub struct UpstreamClients {
    pub http: reqwest::Client,
    pub openai: OpenAiClient,
    pub huggingface: HuggingFaceClient,
    pub deepai: DeepAiClient,
    pub perspective: PerspectiveClient,
}

impl UpstreamClients {
    pub fn new(fake: &FakeUpstream) -> Self {
        let http = reqwest::Client::new();
        Self {
            openai: OpenAiClient::new(http.clone(), Some("sk-test".to_string()))
                .with_base_url(&fake.url("openai")),
            huggingface: HuggingFaceClient::new(http.clone(), Some("hf-test".to_string()))
                .with_base_url(&fake.url("hf")),
            deepai: DeepAiClient::new(http.clone(), Some("deepai-test".to_string()))
                .with_url(&fake.url("deepai")),
            perspective: PerspectiveClient::new(http.clone(), Some("persp-test".to_string()))
                .with_url(&fake.url("perspective")),
            http,
        }
    }
}

pub fn idea_path(source: IdeaSource) -> &'static str {
    match source {
        IdeaSource::JokeApi => "ideas/jokeapi",
        IdeaSource::IcanHazDadJoke => "ideas/dadjoke",
        IdeaSource::Quotable => "ideas/quotable",
        IdeaSource::ZenQuotes => "ideas/zenquotes",
        IdeaSource::AdviceSlip => "ideas/advice",
    }
}

pub fn idea_agent(fake: &FakeUpstream, http: &reqwest::Client) -> IdeaAgent {
    IdeaAgent::with_sources(
        IdeaSource::ALL
            .iter()
            .map(|source| IdeaStrategy::new(http.clone(), *source).with_url(fake.url(idea_path(*source)))),
    )
}

pub fn template_pool(fake: &FakeUpstream, http: &reqwest::Client) -> TemplatePool {
    TemplatePool::new(SOURCE_TIMEOUT)
        .with_source(ImgflipSource::new(http.clone()).with_base_url(&fake.url("imgflip")))
        .with_source(RedditSource::new(http.clone()).with_url(&fake.url("reddit/memes.json")))
        .with_source(MemegenSource::new(http.clone()).with_base_url(&fake.url("memegen")))
}

pub fn compliance_chain(clients: &UpstreamClients, workdir: &Path) -> ComplianceChain {
    ComplianceChain::new()
        .with_checker(OpenAiModerationChecker::new(clients.openai.clone()))
        .with_checker(BannedWordChecker::default())
        .with_checker(HuggingFaceToxicityChecker::new(clients.huggingface.clone()))
        .with_checker(PerspectiveChecker::new(clients.perspective.clone()))
        .with_log(Arc::new(ComplianceLog::new(workdir.join("compliance_logs.csv"))))
}

pub fn upstream_parts(fake: &FakeUpstream, workdir: &Path) -> OrchestratorParts {
    let clients = UpstreamClients::new(fake);
    let outputs = workdir.join("outputs");

    OrchestratorParts {
        ideas: idea_agent(fake, &clients.http),
        templates: template_pool(fake, &clients.http),
        ranker: TemplateRanker::with_providers(
            Arc::new(CachedEmbedder::new(OpenAiEmbedder::new(clients.openai.clone()))),
            Arc::new(LexicalEmbedder::default()),
        ),
        captions: CaptionAgent::new(
            clients.openai.clone(),
            clients.huggingface.clone(),
            clients.deepai.clone(),
        ),
        generator: ImageGenerator::new(ImageBackend::default_order())
            .with_backend(
                ImageBackend::Imgflip,
                ImgflipBackend::new(
                    clients.http.clone(),
                    Some(IMGFLIP_USER.to_string()),
                    Some(IMGFLIP_PASS.to_string()),
                )
                .with_base_url(&fake.url("imgflip")),
            )
            .with_backend(
                ImageBackend::OpenAi,
                OpenAiImageBackend::new(clients.openai.clone(), &outputs),
            )
            .with_backend(ImageBackend::Memegen, MemegenBackend::default())
            .with_backend(ImageBackend::Local, LocalOverlayBackend::new(&outputs)),
        planner: Planner::new(
            clients.openai.clone(),
            GrokClient::new(DEFAULT_GROK_MODEL, false),
        ),
        compliance: compliance_chain(&clients, workdir),
        template_ttl: DEFAULT_TEMPLATE_CACHE_TTL,
        top_k: DEFAULT_TOP_K,
    }
}
