//! Upstream error definitions.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised while talking to the identity provider.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-success status where success is required.
    #[error("{endpoint} returned status {status}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },

    /// The provider's body is not the JSON shape this proxy depends on.
    #[error("{endpoint} returned a malformed body: {reason}")]
    Malformed {
        endpoint: &'static str,
        reason: String,
    },
}

impl UpstreamError {
    pub fn missing_field(endpoint: &'static str, field: &str) -> Self {
        Self::Malformed {
            endpoint,
            reason: format!("missing string field '{}'", field),
        }
    }
}
