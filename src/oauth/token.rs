//! Token issuance.
//!
//! # Responsibilities
//! - Forward the caller's form to the provider, forcing JSON output
//! - Stamp `token_type: Bearer` on every response
//! - Fold `error_description` into `error` on provider errors
//! - Register issued tokens against the requesting client id
//!
//! # Design Decisions
//! - `client_id` is checked before any upstream call
//! - The provider's status code is returned unchanged
//! - Provider errors are relayed, never turned into local failures

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde_json::{Map, Value};

use crate::http::response::ProxyError;
use crate::http::server::AppState;
use crate::upstream::client::TOKEN_PATH;
use crate::upstream::UpstreamError;

pub const TOKEN_TYPE: &str = "Bearer";

/// Result of reshaping a provider token response.
#[derive(Debug, PartialEq)]
pub enum TokenOutcome {
    /// A token was issued and should be registered.
    Issued {
        body: Map<String, Value>,
        access_token: String,
    },
    /// The provider refused; relay the merged error and register nothing.
    Rejected { body: Map<String, Value> },
}

impl TokenOutcome {
    pub fn into_body(self) -> Map<String, Value> {
        match self {
            TokenOutcome::Issued { body, .. } | TokenOutcome::Rejected { body } => body,
        }
    }
}

/// Reshape a provider token response body.
pub fn normalize_token_response(
    mut body: Map<String, Value>,
) -> Result<TokenOutcome, UpstreamError> {
    body.insert("token_type".to_string(), Value::String(TOKEN_TYPE.to_string()));

    let error = body
        .get("error")
        .filter(|v| is_truthy(v))
        .map(display_value);

    if let Some(error) = error {
        let merged = match body.get("error_description") {
            Some(description) if !description.is_null() => {
                format!("{} {}", error, display_value(description))
            }
            _ => error,
        };
        body.insert("error".to_string(), Value::String(merged));
        return Ok(TokenOutcome::Rejected { body });
    }

    let access_token = body
        .get("access_token")
        .and_then(Value::as_str)
        .ok_or_else(|| UpstreamError::missing_field(TOKEN_PATH, "access_token"))?
        .to_string();

    Ok(TokenOutcome::Issued { body, access_token })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Bool(true) => true,
    }
}

// Strings render without quotes; the provider sometimes sends numeric codes.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Prepare the outbound form: every inbound field in order, `fmt=json` last.
pub fn outbound_form(fields: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut form: Vec<_> = fields.into_iter().filter(|(k, _)| k != "fmt").collect();
    form.push(("fmt".to_string(), "json".to_string()));
    form
}

/// `POST /oauth2.0/token`
pub async fn token_handler(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, ProxyError> {
    let client_id = fields
        .iter()
        .rev()
        .find(|(k, _)| k == "client_id")
        .map(|(_, v)| v.clone())
        .filter(|v| !v.is_empty())
        .ok_or(ProxyError::MissingField("client_id"))?;

    let form = outbound_form(fields);
    let upstream = state.upstream.request_token(&form).await?;
    let status = upstream.status;

    let outcome = normalize_token_response(upstream.body)?;
    match &outcome {
        TokenOutcome::Issued { access_token, .. } => {
            state.registry.record(access_token.as_str(), client_id.as_str());
            tracing::info!(client_id = %client_id, status = %status, "Token issued");
        }
        TokenOutcome::Rejected { body } => {
            let error = body.get("error").and_then(|v| v.as_str()).unwrap_or_default();
            tracing::info!(
                client_id = %client_id,
                status = %status,
                error,
                "Token request rejected by provider"
            );
        }
    }

    Ok(json_with_status(status, outcome.into_body()))
}

fn json_with_status(status: StatusCode, body: Map<String, Value>) -> Response {
    (status, Json(Value::Object(body))).into_response()
}
