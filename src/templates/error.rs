use thiserror::Error;

/// Failure fetching one template source; isolated to that source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{origin} request failed: {source}")]
    Request {
        origin: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{origin} returned status {status}")]
    Status { origin: &'static str, status: u16 },

    #[error("{origin} returned an unusable payload: {reason}")]
    Malformed { origin: &'static str, reason: String },

    #[error("{origin} timed out after {millis}ms")]
    Timeout { origin: &'static str, millis: u128 },
}
