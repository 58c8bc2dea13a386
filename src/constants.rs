//! Cross-cutting, shared constants.
//!
//! Agent-specific defaults live next to the agent; the values here are shared by
//! at least two modules (config defaults, ranking, embedding, gateway).

use std::time::Duration;

/// Agent identifier reported by the health endpoint.
pub const AGENT_NAME: &str = "memeforge";

/// Dimension of the local lexical embedding (matches MiniLM so vectors line up in logs).
pub const LEXICAL_EMBEDDING_DIM: usize = 384;

/// Added to each norm in the cosine denominator.
pub const COSINE_EPSILON: f32 = 1e-10;

/// Score bonus per distinct tag found in a candidate name.
pub const TAG_BONUS_PER_MATCH: f32 = 0.05;

/// Maximum number of tags that contribute a bonus (max bonus = 0.15).
pub const TAG_BONUS_MAX_MATCHES: usize = 3;

/// Default number of templates returned by ranking.
pub const DEFAULT_TOP_K: usize = 10;

/// Default template cache time-to-live (30 minutes).
pub const DEFAULT_TEMPLATE_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Default timeout for free third-party APIs.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Default timeout for OpenAI calls.
pub const DEFAULT_OPENAI_TIMEOUT: Duration = Duration::from_secs(60);

/// Default toxicity score at or above which a caption is blocked.
pub const DEFAULT_TOXICITY_THRESHOLD: f32 = 0.8;

/// Default rate-limit ceiling per client per window.
pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 30;

/// Default rate-limit window.
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Maximum characters kept from a planner search prompt.
pub const MAX_SEARCH_PROMPT_CHARS: usize = 120;

/// Maximum tags kept from a planner response.
pub const MAX_PLANNER_TAGS: usize = 8;

/// Separator between top and bottom caption text.
pub const CAPTION_SEPARATOR: &str = "//";
