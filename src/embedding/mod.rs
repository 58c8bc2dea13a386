//! Text embedding providers for template ranking.
//!
//! - [`OpenAiEmbedder`] is the remote primary (paid mode only).
//! - [`LexicalEmbedder`] is the always-available local fallback.
//! - [`CachedEmbedder`] memoises per-text vectors of a remote provider.
//!
//! [`embedding_chain`] wires a primary and a secondary into a two-strategy
//! [`FallbackChain`] with no rotation.

mod cached;
mod error;
mod lexical;
mod openai;


pub use cached::CachedEmbedder;
pub use error::EmbeddingError;
pub use lexical::LexicalEmbedder;
pub use openai::OpenAiEmbedder;

use std::sync::Arc;

use async_trait::async_trait;

use crate::fallback::{FallbackChain, Strategy, StrategyError};

/// Batch of texts to embed (the first entry is the query by convention).
pub type EmbeddingBatch = Vec<String>;

/// One vector per input text, in input order.
pub type Embeddings = Vec<Vec<f32>>;

/// Produces fixed-length vectors for a batch of texts.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn embed(&self, texts: &[String]) -> Result<Embeddings, EmbeddingError>;
}

#[async_trait]
impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn embed(&self, texts: &[String]) -> Result<Embeddings, EmbeddingError> {
        (**self).embed(texts).await
    }
}

/// Adapts an [`EmbeddingProvider`] to the fallback executor.
pub struct EmbeddingStrategy {
    provider: Arc<dyn EmbeddingProvider>,
}

impl EmbeddingStrategy {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Strategy<EmbeddingBatch, Embeddings> for EmbeddingStrategy {
    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn invoke(&self, input: &EmbeddingBatch) -> Result<Embeddings, StrategyError> {
        let vectors = self.provider.embed(input).await?;
        if vectors.len() != input.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: input.len(),
                actual: vectors.len(),
            }
            .into());
        }
        Ok(vectors)
    }
}

/// Accepts a non-empty batch of equally sized, non-empty vectors.
pub fn embeddings_are_valid(vectors: &Embeddings) -> bool {
    match vectors.first() {
        Some(first) if !first.is_empty() => vectors.iter().all(|v| v.len() == first.len()),
        _ => false,
    }
}

/// Primary-then-secondary embedding chain used by the ranker.
pub fn embedding_chain(
    primary: Arc<dyn EmbeddingProvider>,
    secondary: Arc<dyn EmbeddingProvider>,
) -> FallbackChain<EmbeddingBatch, Embeddings> {
    FallbackChain::new("embedding")
        .with_strategy(EmbeddingStrategy::new(primary))
        .with_strategy(EmbeddingStrategy::new(secondary))
        .with_predicate(embeddings_are_valid)
}
