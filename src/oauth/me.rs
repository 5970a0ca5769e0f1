//! Identity lookup (`GET /oauth2.0/me`).
//!
//! # Data Flow
//! ```text
//! Authorization: Bearer <token>
//!     → bearer.rs (extract token; 401 when absent)
//!     → provider /oauth2.0/me (token → openid; non-2xx aborts)
//!     → registry (token → client id; 401 when unknown)
//!     → provider /user/get_user_info (profile)
//!     → identity.rs (normalized record)
//! ```
//!
//! # Design Decisions
//! - The response status is the profile call's status; the identity check
//!   status only decides whether to continue
//! - The registry check runs after the provider confirms the token, so an
//!   unknown token costs one upstream call

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::http::request::RequestIdExt;
use crate::http::response::ProxyError;
use crate::http::server::AppState;
use crate::oauth::bearer::token_from_headers;
use crate::oauth::identity::IdentityRecord;
use crate::upstream::client::ME_PATH;
use crate::upstream::UpstreamError;

/// `GET /oauth2.0/me`
pub async fn me_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ProxyError> {
    let token = token_from_headers(&headers)?;

    let owner = state.upstream.whoami(token).await?;
    let openid = owner
        .get("openid")
        .and_then(Value::as_str)
        .ok_or_else(|| UpstreamError::missing_field(ME_PATH, "openid"))?;

    let client_id = state.registry.client_id_for(token).ok_or_else(|| {
        tracing::debug!(
            request_id = %headers.request_id(),
            "Token confirmed upstream but not issued by this proxy"
        );
        ProxyError::InvalidAccessToken
    })?;

    let profile = state
        .upstream
        .get_user_info(token, &client_id, openid)
        .await?;
    let record = IdentityRecord::from_profile(openid, &profile.body)?;

    tracing::info!(client_id = %client_id, status = %profile.status, "Identity resolved");

    Ok((profile.status, Json(record)).into_response())
}
