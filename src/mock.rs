//! Deterministic test doubles for the pluggable seams (embedding providers,
//! template sources, image backends and compliance checkers), plus an offline
//! [`OrchestratorParts`] builder that never touches the network.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::captions::{Caption, CaptionAgent, CaptionRequest, LocalCaptions};
use crate::compliance::{BannedWordChecker, CheckOutcome, Checker, ComplianceChain, ComplianceLog};
use crate::constants::{DEFAULT_TEMPLATE_CACHE_TTL, DEFAULT_TOP_K};
use crate::embedding::{EmbeddingError, EmbeddingProvider, Embeddings};
use crate::fallback::{Strategy, StrategyError};
use crate::generator::{
    GenerateRequest, ImageBackend, ImageGenerator, LocalOverlayBackend, MemegenBackend,
};
use crate::ideas::IdeaAgent;
use crate::orchestrator::OrchestratorParts;
use crate::planner::Planner;
use crate::providers::grok::DEFAULT_GROK_MODEL;
use crate::providers::{GrokClient, OpenAiClient, ProviderError};
use crate::ranking::TemplateRanker;
use crate::templates::{Candidate, SourceError, TemplatePool, TemplateSource};

/// Bag-of-words embedder over the vocabulary of the batch, so similarity is
/// monotonic in word overlap.
#[derive(Debug, Default, Clone)]
pub struct VocabularyEmbedder;

impl VocabularyEmbedder {
    fn words(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for VocabularyEmbedder {
    fn name(&self) -> &str {
        "vocabulary"
    }

    async fn embed(&self, texts: &[String]) -> Result<Embeddings, EmbeddingError> {
        let vocabulary: Vec<String> = texts
            .iter()
            .flat_map(|t| Self::words(t))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(texts
            .iter()
            .map(|text| {
                let words = Self::words(text);
                let mut vector: Vec<f32> = vocabulary
                    .iter()
                    .map(|v| words.iter().filter(|w| *w == v).count() as f32)
                    .collect();
                if vector.is_empty() {
                    vector.push(0.0);
                }
                vector
            })
            .collect())
    }
}

/// Embedder that always reports itself unconfigured.
#[derive(Debug, Default, Clone)]
pub struct UnavailableEmbedder;

#[async_trait]
impl EmbeddingProvider for UnavailableEmbedder {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn embed(&self, _texts: &[String]) -> Result<Embeddings, EmbeddingError> {
        Err(ProviderError::Unconfigured {
            provider: "unavailable",
        }
        .into())
    }
}

/// Template source returning a fixed list and counting fetches.
#[derive(Debug, Clone)]
pub struct StaticTemplateSource {
    name: &'static str,
    candidates: Vec<Candidate>,
    fetches: Arc<AtomicUsize>,
}

impl StaticTemplateSource {
    pub fn new(name: &'static str, candidates: Vec<Candidate>) -> Self {
        Self {
            name,
            candidates,
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared fetch counter (clone before handing the source to a pool).
    pub fn fetch_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.fetches)
    }
}

#[async_trait]
impl TemplateSource for StaticTemplateSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self) -> Result<Vec<Candidate>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidates.clone())
    }
}

/// Checker with a fixed outcome that counts how often it ran.
#[derive(Debug, Clone)]
pub struct FixedChecker {
    name: &'static str,
    outcome: CheckOutcome,
    runs: Arc<AtomicUsize>,
}

impl FixedChecker {
    pub fn passing(name: &'static str) -> Self {
        Self::new(name, CheckOutcome::pass("ok"))
    }

    pub fn blocking(name: &'static str, reason: &str) -> Self {
        Self::new(name, CheckOutcome::block(reason))
    }

    pub fn new(name: &'static str, outcome: CheckOutcome) -> Self {
        Self {
            name,
            outcome,
            runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn run_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.runs)
    }
}

#[async_trait]
impl Checker for FixedChecker {
    fn name(&self) -> &str {
        self.name
    }

    async fn check(&self, _caption: &str) -> CheckOutcome {
        self.runs.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Image backend with a fixed answer that counts how often it ran.
#[derive(Debug, Clone)]
pub struct StaticImageBackend {
    name: &'static str,
    url: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl StaticImageBackend {
    pub fn returning(name: &'static str, url: &str) -> Self {
        Self {
            name,
            url: Some(url.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(name: &'static str) -> Self {
        Self {
            name,
            url: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Strategy<GenerateRequest, String> for StaticImageBackend {
    fn name(&self) -> &str {
        self.name
    }

    async fn invoke(&self, _input: &GenerateRequest) -> Result<String, StrategyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.url
            .clone()
            .ok_or_else(|| StrategyError::transport("static backend down"))
    }
}

/// Small named pool used by offline tests.
pub fn sample_candidates() -> Vec<Candidate> {
    vec![
        Candidate::new("1", "cat meme", "https://img.test/cat.png", "static"),
        Candidate::new("2", "office meme", "https://img.test/office.png", "static"),
        Candidate::new("3", "cat office hybrid", "https://img.test/hybrid.png", "static"),
        Candidate::new("memegen:drake", "Drake Hotline Bling", "", "static"),
    ]
}

/// Orchestrator parts wired to local strategies only.
///
/// Ideas always come from the fixed fallback, captions from local templates,
/// ranking from [`VocabularyEmbedder`] after an unavailable primary, and images
/// from Memegen URLs or the SVG overlay written under `workdir`.
pub fn offline_parts(workdir: &Path, candidates: Vec<Candidate>) -> OrchestratorParts {
    let http = reqwest::Client::new();
    let local_captions: Arc<dyn Strategy<CaptionRequest, Vec<Caption>>> = Arc::new(LocalCaptions);

    OrchestratorParts {
        ideas: IdeaAgent::with_sources(Vec::new()),
        templates: TemplatePool::default()
            .with_source(StaticTemplateSource::new("static", candidates)),
        ranker: TemplateRanker::with_providers(
            Arc::new(UnavailableEmbedder),
            Arc::new(VocabularyEmbedder),
        ),
        captions: CaptionAgent::with_strategies([local_captions]),
        generator: ImageGenerator::new(vec![ImageBackend::Memegen, ImageBackend::Local])
            .with_backend(ImageBackend::Memegen, MemegenBackend::default())
            .with_backend(
                ImageBackend::Local,
                LocalOverlayBackend::new(workdir.join("outputs")),
            ),
        planner: Planner::new(
            OpenAiClient::new(http, None),
            GrokClient::new(DEFAULT_GROK_MODEL, false),
        ),
        compliance: ComplianceChain::new()
            .with_checker(BannedWordChecker::default())
            .with_log(Arc::new(ComplianceLog::new(workdir.join("compliance_logs.csv")))),
        template_ttl: DEFAULT_TEMPLATE_CACHE_TTL,
        top_k: DEFAULT_TOP_K,
    }
}
