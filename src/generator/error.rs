use thiserror::Error;

use crate::fallback::ExhaustedError;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("unknown image backend '{value}'")]
    UnknownBackend { value: String },

    #[error("template_id must not be empty")]
    MissingTemplate,

    #[error("image generation failed: {}", .0.summary())]
    Exhausted(#[from] ExhaustedError),
}
