use thiserror::Error;

use crate::fallback::StrategyError;
use crate::providers::ProviderError;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("embedding count mismatch: expected {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
}

impl From<EmbeddingError> for StrategyError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::Provider(provider) => provider.into(),
            other => StrategyError::malformed(other.to_string()),
        }
    }
}
