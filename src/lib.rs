//! MemeForge library crate (used by the server binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Core
//! - [`Config`], [`ConfigError`] - Environment-driven configuration
//! - [`FallbackChain`], [`Strategy`], [`ExecutionOutcome`] - Ranked-fallback executor
//! - [`ComplianceChain`], [`Checker`], [`ComplianceVerdict`] - All-must-pass checks
//! - [`Orchestrator`] - Explicit shared state plus every agent
//!
//! ## Agents
//! - [`IdeaAgent`] - Joke, quote and advice sources in rotation
//! - [`TemplatePool`], [`TemplateRanker`] - Template retrieval and ranking
//! - [`CaptionAgent`] - Caption generation and scoring
//! - [`ImageGenerator`] - Imgflip, OpenAI, Memegen and local overlay backends
//! - [`Planner`] - Search and meme planning
//!
//! ## Serving
//! - [`gateway`] - axum router, handlers and error mapping
//! - [`RateLimiter`] - Fixed-window admission
//!
//! ## Test/Mock Support
//! Test doubles are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod captions;
pub mod compliance;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod fallback;
pub mod gateway;
pub mod generator;
pub mod hashing;
pub mod ideas;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod orchestrator;
pub mod planner;
pub mod providers;
pub mod ranking;
pub mod ratelimit;
pub mod templates;

pub use captions::{Caption, CaptionAgent, CaptionRequest, score_caption};
pub use compliance::{
    BannedWordChecker, CheckOutcome, Checker, ComplianceChain, ComplianceLog, ComplianceVerdict,
};
pub use config::{Config, ConfigError};
pub use embedding::{
    CachedEmbedder, EmbeddingError, EmbeddingProvider, LexicalEmbedder, OpenAiEmbedder,
};
pub use fallback::{
    AttemptFailure, ExecutionOutcome, ExhaustedError, FallbackChain, OutcomeSource, Rotation,
    Strategy, StrategyError,
};
pub use gateway::{GatewayError, HandlerState, create_router_with_state};
pub use generator::{GenerateRequest, GeneratedMeme, GeneratorError, ImageBackend, ImageGenerator};
pub use hashing::{hash_client_signature, hash_embedding_key, hash_text, hash_to_u64};
pub use ideas::{Idea, IdeaAgent, IdeaSource};
pub use orchestrator::{Orchestrator, OrchestratorError, OrchestratorParts, OrchestratorState};
pub use planner::{MemePlan, Planner, SearchPlan};
pub use providers::ProviderError;
pub use ranking::{RankingError, ScoredCandidate, TemplateRanker, cosine_similarity, tag_bonus};
pub use ratelimit::{RateLimitExceeded, RateLimiter};
pub use templates::{Candidate, TemplateCache, TemplatePool, TemplateSource, merge_candidates};
