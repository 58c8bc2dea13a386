//! Local TF-IDF style embedder.
//!
//! Unigrams and adjacent-word bigrams are hashed into a fixed number of buckets.
//! Weights are `tf * idf` with the smoothed IDF `ln((1 + n) / (1 + df)) + 1`
//! computed over the batch, so the query and the candidate names must be embedded
//! together. Each vector is L2 normalised; a text with no tokens stays all-zero.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use super::{EmbeddingError, EmbeddingProvider, Embeddings};
use crate::constants::LEXICAL_EMBEDDING_DIM;
use crate::hashing::hash_to_u64;

#[derive(Debug, Clone)]
pub struct LexicalEmbedder {
    dim: usize,
}

impl Default for LexicalEmbedder {
    fn default() -> Self {
        Self::new(LEXICAL_EMBEDDING_DIM)
    }
}

impl LexicalEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Embeds a batch synchronously.
    pub fn embed_batch(&self, texts: &[String]) -> Embeddings {
        let documents: Vec<Vec<String>> = texts.iter().map(|t| features(t)).collect();

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for doc in &documents {
            let distinct: HashSet<&str> = doc.iter().map(String::as_str).collect();
            for feature in distinct {
                *document_frequency.entry(feature).or_insert(0) += 1;
            }
        }

        let n = documents.len() as f32;
        documents
            .iter()
            .map(|doc| {
                let mut term_frequency: HashMap<&str, f32> = HashMap::new();
                for feature in doc {
                    *term_frequency.entry(feature.as_str()).or_insert(0.0) += 1.0;
                }

                let mut vector = vec![0.0f32; self.dim];
                for (feature, tf) in term_frequency {
                    let df = document_frequency.get(feature).copied().unwrap_or(0) as f32;
                    let idf = ((1.0 + n) / (1.0 + df)).ln() + 1.0;
                    let bucket = (hash_to_u64(feature.as_bytes()) % self.dim as u64) as usize;
                    vector[bucket] += tf * idf;
                }

                normalize(&mut vector);
                vector
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for LexicalEmbedder {
    fn name(&self) -> &str {
        "lexical"
    }

    async fn embed(&self, texts: &[String]) -> Result<Embeddings, EmbeddingError> {
        Ok(self.embed_batch(texts))
    }
}

/// Lowercased alphanumeric words plus bigrams of adjacent words.
fn features(text: &str) -> Vec<String> {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();

    let bigrams = words.windows(2).map(|pair| format!("{} {}", pair[0], pair[1]));
    let mut out: Vec<String> = bigrams.collect();
    out.extend(words);
    out
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}
