use thiserror::Error;

use crate::fallback::ExhaustedError;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("top_k must be a positive integer")]
    InvalidTopK,

    /// Every embedding provider failed; scores are never guessed.
    #[error("ranking unavailable: {}", .0.summary())]
    Unavailable(#[from] ExhaustedError),
}
