//! Template retrieval.
//!
//! Candidates are fetched concurrently from independent [`TemplateSource`]s,
//! deduplicated by id and url in source order, and cached for a fixed TTL by the
//! orchestrator (see [`TemplateCache`]).

mod error;
mod pool;
mod sources;
mod types;

#[cfg(test)]
mod tests;

pub use error::SourceError;
pub use pool::{TemplateCache, TemplatePool, merge_candidates};
pub use sources::{
    IMGFLIP_API_URL, ImgflipSource, MEMEGEN_API_URL, MemegenSource, REDDIT_MEMES_URL,
    RedditSource, TemplateSource,
};
pub use types::{Candidate, static_fallback};
