//! HTTP client for the identity provider.
//!
//! # Responsibilities
//! - Build absolute endpoint URLs from the configured base URL
//! - Forward query strings and form bodies unmodified
//! - Decode JSON bodies into objects for the handlers to reshape
//!
//! # Design Decisions
//! - One pooled `reqwest::Client` per process
//! - Redirects are never followed: authorize redirects belong to the caller
//! - No retries; a failed call fails the inbound request

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use reqwest::redirect::Policy;
use serde_json::{Map, Value};
use url::Url;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::upstream::error::UpstreamError;

pub const AUTHORIZE_PATH: &str = "/oauth2.0/authorize";
pub const TOKEN_PATH: &str = "/oauth2.0/token";
pub const ME_PATH: &str = "/oauth2.0/me";
pub const USER_INFO_PATH: &str = "/user/get_user_info";

/// An upstream response relayed without interpretation.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// An upstream response whose body decoded to a JSON object.
#[derive(Debug)]
pub struct JsonResponse {
    pub status: StatusCode,
    pub body: Map<String, Value>,
}

/// Client for the provider's OAuth and profile endpoints.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: Url,
}

impl UpstreamClient {
    /// Build a client from configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ClientBuildError> {
        let base_url = Url::parse(&config.base_url)?;
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .redirect(Policy::none())
            .build()
            .map_err(ClientBuildError::Http)?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url.set_query(None);
        url
    }

    /// GET the authorize endpoint with the caller's query string as-is.
    pub async fn authorize(&self, raw_query: Option<&str>) -> Result<RawResponse, UpstreamError> {
        let mut url = self.endpoint(AUTHORIZE_PATH);
        url.set_query(raw_query);

        let response = self.send(AUTHORIZE_PATH, self.http.get(url)).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|source| UpstreamError::Transport {
                endpoint: AUTHORIZE_PATH,
                source,
            })?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    /// POST a form-encoded token request.
    pub async fn request_token(
        &self,
        form: &[(String, String)],
    ) -> Result<JsonResponse, UpstreamError> {
        let request = self.http.post(self.endpoint(TOKEN_PATH)).form(form);
        let response = self.send(TOKEN_PATH, request).await?;
        json_response(TOKEN_PATH, response).await
    }

    /// Resolve a token to its owner. Any non-success status is an error.
    pub async fn whoami(&self, token: &str) -> Result<Map<String, Value>, UpstreamError> {
        let request = self
            .http
            .get(self.endpoint(ME_PATH))
            .query(&[("access_token", token), ("fmt", "json")]);
        let response = self.send(ME_PATH, request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                endpoint: ME_PATH,
                status,
            });
        }
        Ok(json_response(ME_PATH, response).await?.body)
    }

    /// Fetch the profile of `openid` on behalf of `client_id`.
    pub async fn get_user_info(
        &self,
        token: &str,
        client_id: &str,
        openid: &str,
    ) -> Result<JsonResponse, UpstreamError> {
        let request = self.http.get(self.endpoint(USER_INFO_PATH)).query(&[
            ("access_token", token),
            ("oauth_consumer_key", client_id),
            ("openid", openid),
        ]);
        let response = self.send(USER_INFO_PATH, request).await?;
        json_response(USER_INFO_PATH, response).await
    }

    async fn send(
        &self,
        endpoint: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, UpstreamError> {
        match request.send().await {
            Ok(response) => {
                tracing::debug!(endpoint, status = %response.status(), "Upstream responded");
                metrics::record_upstream_call(endpoint, response.status().as_u16().to_string());
                Ok(response)
            }
            Err(source) => {
                tracing::warn!(endpoint, error = %source, "Upstream request failed");
                metrics::record_upstream_call(endpoint, "error".to_string());
                Err(UpstreamError::Transport { endpoint, source })
            }
        }
    }
}

async fn json_response(
    endpoint: &'static str,
    response: reqwest::Response,
) -> Result<JsonResponse, UpstreamError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|source| UpstreamError::Transport { endpoint, source })?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(body)) => Ok(JsonResponse { status, body }),
        Ok(other) => Err(UpstreamError::Malformed {
            endpoint,
            reason: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
        Err(e) => Err(UpstreamError::Malformed {
            endpoint,
            reason: format!("invalid JSON: {}", e),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Failure to construct the upstream client at startup.
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error("invalid upstream base URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Http(reqwest::Error),
}
