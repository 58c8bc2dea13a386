//! Idea sourcing from five public joke, quote and advice APIs.
//!
//! The caller passes the rotation offset so repeated calls start from a
//! different source each time.

mod sources;


pub use sources::{IdeaSource, IdeaStrategy};

use serde::Serialize;
use tracing::info;

use crate::fallback::{ExecutionOutcome, FallbackChain};

/// Served when every source fails.
pub const FALLBACK_IDEA: &str =
    "When the code finally compiles but you have no idea why it works.";

/// An idea and the source that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Idea {
    pub idea: String,
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct IdeaAgent {
    chain: FallbackChain<(), String>,
}

impl IdeaAgent {
    /// All five sources in their canonical order.
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_sources(
            IdeaSource::ALL
                .iter()
                .map(|source| IdeaStrategy::new(http.clone(), *source)),
        )
    }

    pub fn with_sources(strategies: impl IntoIterator<Item = IdeaStrategy>) -> Self {
        let mut chain = FallbackChain::new("ideas").with_predicate(|idea: &String| !idea.trim().is_empty());
        for strategy in strategies {
            chain = chain.with_strategy(strategy);
        }
        Self { chain }
    }

    pub fn source_count(&self) -> usize {
        self.chain.len()
    }

    pub fn source_names(&self) -> Vec<String> {
        self.chain.strategy_names()
    }

    /// Fetches one idea starting at `offset`; never fails.
    pub async fn get_idea(&self, offset: usize) -> ExecutionOutcome<Idea> {
        let outcome = self.chain.execute(&(), offset, FALLBACK_IDEA.to_string()).await;
        info!(source = %outcome.source, attempts = outcome.attempts(), "Idea sourced");
        let source = outcome.source.as_str().to_string();
        outcome.map(|idea| Idea {
            idea: idea.trim().to_string(),
            source,
        })
    }
}
