//! Candidate ranking: embedding similarity plus a bounded tag bonus.
//!
//! The query and every candidate name are embedded in one batch through the
//! two-strategy embedding chain, scored against the query only, and sorted with
//! a stable descending sort so ties keep discovery order.

mod error;
mod scoring;


pub use error::RankingError;
pub use scoring::{cosine_similarity, normalize_tags, tag_bonus};

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::embedding::{EmbeddingBatch, EmbeddingProvider, Embeddings, embedding_chain};
use crate::fallback::FallbackChain;
use crate::templates::Candidate;

/// A candidate with its final score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub score: f32,
}

#[derive(Debug, Clone)]
pub struct TemplateRanker {
    chain: FallbackChain<EmbeddingBatch, Embeddings>,
}

impl TemplateRanker {
    pub fn new(chain: FallbackChain<EmbeddingBatch, Embeddings>) -> Self {
        Self { chain }
    }

    pub fn with_providers(
        primary: Arc<dyn EmbeddingProvider>,
        secondary: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self::new(embedding_chain(primary, secondary))
    }

    /// Ranks `pool` against `query` and returns at most `top_k` candidates.
    #[tracing::instrument(skip(self, pool, tags), fields(pool = pool.len()))]
    pub async fn rank(
        &self,
        query: &str,
        pool: &[Candidate],
        tags: &[String],
        top_k: usize,
    ) -> Result<Vec<ScoredCandidate>, RankingError> {
        if top_k == 0 {
            return Err(RankingError::InvalidTopK);
        }
        let query = query.trim();
        if query.is_empty() || pool.is_empty() {
            return Ok(Vec::new());
        }

        let mut batch: EmbeddingBatch = Vec::with_capacity(pool.len() + 1);
        batch.push(query.to_string());
        batch.extend(pool.iter().map(|c| c.name.clone()));

        let outcome = self.chain.try_execute(&batch, 0).await?;
        debug!(embedder = %outcome.source, "Embedded ranking batch");

        let tags = normalize_tags(tags);
        let (query_vector, candidate_vectors) = match outcome.value.split_first() {
            Some(split) => split,
            None => return Ok(Vec::new()),
        };

        let mut scored: Vec<ScoredCandidate> = pool
            .iter()
            .zip(candidate_vectors)
            .map(|(candidate, vector)| ScoredCandidate {
                score: cosine_similarity(vector, query_vector) + tag_bonus(&candidate.name, &tags),
                candidate: candidate.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }
}
