use thiserror::Error;

use crate::fallback::StrategyError;

/// Failure talking to a third-party API.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No credentials (or paid mode disabled) for this provider.
    #[error("{provider} is not configured")]
    Unconfigured { provider: &'static str },

    /// Timeout, DNS, TLS or connection failure.
    #[error("{provider} request failed: {source}")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response.
    #[error("{provider} returned status {status}")]
    Status { provider: &'static str, status: u16 },

    /// Well-formed response without the expected field.
    #[error("{provider} returned an unusable payload: {reason}")]
    Malformed {
        provider: &'static str,
        reason: String,
    },

    /// Error raised by an SDK client rather than by our HTTP layer.
    #[error("{provider} client error: {reason}")]
    Client {
        provider: &'static str,
        reason: String,
    },

    /// Local I/O while persisting a provider result.
    #[error("{provider} could not persist output: {source}")]
    Io {
        provider: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl ProviderError {
    pub(crate) fn request(provider: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| ProviderError::Request { provider, source }
    }

    pub(crate) fn malformed(provider: &'static str, reason: impl Into<String>) -> Self {
        ProviderError::Malformed {
            provider,
            reason: reason.into(),
        }
    }

    /// Returns `true` when the provider was skipped for lack of configuration.
    pub fn is_unconfigured(&self) -> bool {
        matches!(self, ProviderError::Unconfigured { .. })
    }
}

impl From<ProviderError> for StrategyError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unconfigured { .. } => StrategyError::unavailable(err.to_string()),
            ProviderError::Request { .. } | ProviderError::Client { .. } => {
                StrategyError::transport(err.to_string())
            }
            ProviderError::Status { status, .. } => StrategyError::Status { status },
            ProviderError::Malformed { .. } | ProviderError::Io { .. } => {
                StrategyError::malformed(err.to_string())
            }
        }
    }
}
