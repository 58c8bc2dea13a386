use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::MEMEFORGE_STATUS_HEADER;
use crate::generator::GeneratorError;
use crate::orchestrator::OrchestratorError;
use crate::ranking::RankingError;
use crate::ratelimit::RateLimitExceeded;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("missing or invalid API key")]
    Unauthorized,

    #[error("caption blocked: {reason}")]
    PolicyViolation { reason: String },

    #[error("rate limit exceeded; retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("service degraded: {0}")]
    Degraded(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RateLimitExceeded> for GatewayError {
    fn from(e: RateLimitExceeded) -> Self {
        GatewayError::RateLimited {
            retry_after_secs: e.retry_after_secs(),
        }
    }
}

impl From<OrchestratorError> for GatewayError {
    fn from(e: OrchestratorError) -> Self {
        match e {
            OrchestratorError::Blocked { reason } => GatewayError::PolicyViolation { reason },
            OrchestratorError::Ranking(RankingError::InvalidTopK) => {
                GatewayError::InvalidRequest(RankingError::InvalidTopK.to_string())
            }
            OrchestratorError::Ranking(RankingError::Unavailable(exhausted)) => {
                GatewayError::Degraded(exhausted.summary())
            }
            OrchestratorError::Generator(GeneratorError::Exhausted(exhausted)) => {
                GatewayError::Degraded(exhausted.summary())
            }
            OrchestratorError::Generator(e) => GatewayError::InvalidRequest(e.to_string()),
            other => GatewayError::Internal(other.to_string()),
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, memeforge_status) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            GatewayError::PolicyViolation { .. } => (StatusCode::FORBIDDEN, "blocked"),
            GatewayError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            GatewayError::Degraded(_) => (StatusCode::BAD_GATEWAY, "degraded"),
            GatewayError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            MEMEFORGE_STATUS_HEADER,
            HeaderValue::from_static(memeforge_status),
        );
        if let GatewayError::RateLimited { retry_after_secs } = &self {
            headers.insert(RETRY_AFTER, HeaderValue::from(*retry_after_secs));
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
