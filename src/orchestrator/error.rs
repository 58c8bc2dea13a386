use thiserror::Error;

use crate::compliance::BannedWordsError;
use crate::generator::GeneratorError;
use crate::ranking::RankingError;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("caption blocked: {reason}")]
    Blocked { reason: String },

    #[error(transparent)]
    Ranking(#[from] RankingError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    BannedWords(#[from] BannedWordsError),
}
