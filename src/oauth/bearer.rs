//! `Authorization` header parsing.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::http::response::ProxyError;

/// Strip a leading `Bearer ` from a header value.
///
/// Values without the prefix pass through unchanged; the provider decides
/// whether they are valid tokens.
pub fn bearer_token(value: &str) -> &str {
    value.strip_prefix("Bearer ").unwrap_or(value)
}

/// Pull the access token out of a request's headers.
///
/// A header that is absent, empty, or not printable ASCII counts as missing.
pub fn token_from_headers(headers: &HeaderMap) -> Result<&str, ProxyError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(ProxyError::MissingAuthorization)?;

    Ok(bearer_token(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_strips_bearer_prefix() {
        assert_eq!(bearer_token("Bearer T1"), "T1");
        assert_eq!(bearer_token("Bearer "), "");
    }

    #[test]
    fn test_passes_through_without_prefix() {
        assert_eq!(bearer_token("T1"), "T1");
        assert_eq!(bearer_token("bearer T1"), "bearer T1");
        assert_eq!(bearer_token("Basic dXNlcg=="), "Basic dXNlcg==");
    }

    #[test]
    fn test_only_first_prefix_is_stripped() {
        assert_eq!(bearer_token("Bearer Bearer T1"), "Bearer T1");
    }

    #[test]
    fn test_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            token_from_headers(&headers),
            Err(ProxyError::MissingAuthorization)
        ));
    }

    #[test]
    fn test_empty_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(""));
        assert!(matches!(
            token_from_headers(&headers),
            Err(ProxyError::MissingAuthorization)
        ));
    }

    #[test]
    fn test_header_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(token_from_headers(&headers).unwrap(), "abc");
    }
}
