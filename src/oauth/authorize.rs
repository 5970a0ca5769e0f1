//! Authorization redirect pass-through.
//!
//! The caller's query string goes to the provider untouched and the
//! provider's status, headers and body come back untouched, apart from
//! hop-by-hop headers which describe the upstream connection only.

use axum::{
    body::Body,
    extract::{RawQuery, State},
    http::{header::CONNECTION, HeaderMap},
    response::Response,
};

use crate::http::response::ProxyError;
use crate::http::server::AppState;

const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "transfer-encoding",
    "te",
    "trailer",
    "upgrade",
    "proxy-authenticate",
    "proxy-authorization",
    // Re-framed locally
    "content-length",
];

/// Copy upstream response headers, dropping connection-scoped ones.
///
/// Besides the fixed hop-by-hop set, any header named in the upstream's
/// `Connection` value is connection-scoped too.
pub fn relayable_headers(upstream: &HeaderMap) -> HeaderMap {
    let listed: Vec<String> = upstream
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if HOP_BY_HOP.contains(&name.as_str()) || listed.iter().any(|l| l == name.as_str()) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

/// `GET /oauth2.0/authorize`
pub async fn authorize_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, ProxyError> {
    let upstream = state.upstream.authorize(query.as_deref()).await?;

    tracing::debug!(status = %upstream.status, "Relaying authorize response");

    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    *response.headers_mut() = relayable_headers(&upstream.headers);
    Ok(response)
}
