//! Per-text memoisation for remote embedding providers.
//!
//! Template names repeat across requests, so only the misses of each batch are
//! sent upstream. Do not wrap [`super::LexicalEmbedder`]: its weights depend on
//! the whole batch.

use std::sync::Arc;

use async_trait::async_trait;
use moka::sync::Cache;
use tracing::debug;

use super::{EmbeddingError, EmbeddingProvider, Embeddings};
use crate::hashing::hash_embedding_key;

pub struct CachedEmbedder<P> {
    inner: P,
    entries: Cache<[u8; 32], Arc<Vec<f32>>>,
}

impl<P: EmbeddingProvider> CachedEmbedder<P> {
    const DEFAULT_CAPACITY: u64 = 10_000;

    pub fn new(inner: P) -> Self {
        Self::with_capacity(inner, Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(inner: P, capacity: u64) -> Self {
        Self {
            inner,
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Number of cached vectors (approximate until pending tasks run).
    pub fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }
}

#[async_trait]
impl<P: EmbeddingProvider> EmbeddingProvider for CachedEmbedder<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn embed(&self, texts: &[String]) -> Result<Embeddings, EmbeddingError> {
        let provider = self.inner.name();
        let keys: Vec<[u8; 32]> = texts
            .iter()
            .map(|t| hash_embedding_key(provider, t))
            .collect();

        let mut slots: Vec<Option<Arc<Vec<f32>>>> =
            keys.iter().map(|k| self.entries.get(k)).collect();

        let mut miss_texts = Vec::new();
        let mut miss_positions = Vec::new();
        for (position, slot) in slots.iter().enumerate() {
            if slot.is_none() {
                miss_texts.push(texts[position].clone());
                miss_positions.push(position);
            }
        }

        debug!(
            provider = %provider,
            hits = texts.len() - miss_texts.len(),
            misses = miss_texts.len(),
            "Embedding cache lookup"
        );

        if !miss_texts.is_empty() {
            let fresh = self.inner.embed(&miss_texts).await?;
            if fresh.len() != miss_texts.len() {
                return Err(EmbeddingError::CountMismatch {
                    expected: miss_texts.len(),
                    actual: fresh.len(),
                });
            }
            for (position, vector) in miss_positions.into_iter().zip(fresh) {
                let vector = Arc::new(vector);
                self.entries.insert(keys[position], Arc::clone(&vector));
                slots[position] = Some(vector);
            }
        }

        Ok(slots
            .into_iter()
            .map(|slot| slot.map(|v| v.as_ref().clone()).unwrap_or_default())
            .collect())
    }
}
