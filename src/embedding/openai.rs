use async_trait::async_trait;

use super::{EmbeddingError, EmbeddingProvider, Embeddings};
use crate::providers::OpenAiClient;

/// Remote embeddings through the OpenAI embeddings endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: OpenAiClient,
}

impl OpenAiEmbedder {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai"
    }

    async fn embed(&self, texts: &[String]) -> Result<Embeddings, EmbeddingError> {
        Ok(self.client.embed(texts).await?)
    }
}
