//! Error responses for the proxy's own endpoints.
//!
//! # Responsibilities
//! - Map handler failures to HTTP status codes
//! - Render a short `{"detail": ...}` body
//! - Log server-side failures with their cause
//!
//! # Design Decisions
//! - Client errors name the problem; server errors never expose internals
//! - Upstream transport and status failures surface as 502 Bad Gateway
//! - Malformed upstream bodies surface as 500 Internal Server Error

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::upstream::UpstreamError;

/// Failure of one inbound request.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Authorization header is required")]
    MissingAuthorization,

    #[error("Invalid access token")]
    InvalidAccessToken,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingAuthorization | ProxyError::InvalidAccessToken => {
                StatusCode::UNAUTHORIZED
            }
            ProxyError::MissingField(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(UpstreamError::Malformed { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "Request failed");
            status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        } else {
            tracing::warn!(error = %self, status = %status, "Request rejected");
            self.to_string()
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}
