use thiserror::Error;

use super::types::AttemptFailure;

/// Why a single strategy attempt did not produce an accepted result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    /// The backing service is not configured or does not apply to this input.
    #[error("unavailable: {reason}")]
    Unavailable { reason: String },

    /// Timeout, connection failure or other client-side transport error.
    #[error("transport failure: {reason}")]
    Transport { reason: String },

    /// The upstream answered with a non-2xx status.
    #[error("upstream returned status {status}")]
    Status { status: u16 },

    /// The upstream answered but the expected field was missing or unusable.
    #[error("malformed payload: {reason}")]
    Malformed { reason: String },

    /// The result was produced but the validity predicate refused it.
    #[error("rejected by validity predicate")]
    Rejected,
}

impl StrategyError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

/// Every strategy in a chain failed (or the chain was empty).
#[derive(Debug, Clone, Error)]
#[error("{chain}: all {} strategies failed", .failures.len())]
pub struct ExhaustedError {
    /// Label of the chain that was exhausted.
    pub chain: &'static str,
    /// One entry per attempted strategy, in attempt order.
    pub failures: Vec<AttemptFailure>,
}

impl ExhaustedError {
    /// Renders the failures as `name: reason` pairs for logs and error bodies.
    pub fn summary(&self) -> String {
        if self.failures.is_empty() {
            return "no strategies configured".to_string();
        }
        self.failures
            .iter()
            .map(|f| format!("{}: {}", f.strategy, f.reason))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
