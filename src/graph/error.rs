//! Graph API error taxonomy and classification
//!
//! The upstream error envelope varies in shape, so extraction here is
//! defensive. Token expiry is surfaced as its own variant so the HTTP layer
//! can route the dashboard to re-authentication instead of a generic banner.

use serde_json::Value;
use thiserror::Error;

/// Error code the Graph API uses for expired or invalidated sessions.
const EXPIRED_SESSION_CODE: i64 = 190;

/// Error type string for authentication failures.
const AUTH_EXCEPTION_TYPE: &str = "OAuthException";

#[derive(Debug, Error)]
pub enum GraphError {
    /// The upstream rejected the credential; the caller should re-authenticate.
    #[error("access token expired: {message}")]
    TokenExpired { message: String, code: Option<i64> },

    /// Any other upstream failure (rate limit, permissions, bad request).
    #[error("graph api error: {0}")]
    Api(String),

    /// The caller omitted a required parameter; no upstream call was made.
    #[error("missing required parameter: {0}")]
    MissingParam(&'static str),

    #[error("graph api request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl GraphError {
    pub fn is_token_expired(&self) -> bool {
        matches!(self, GraphError::TokenExpired { .. })
    }
}

/// Classify an upstream error body into a [`GraphError`].
///
/// Accepts either the whole response (`{"error": {...}}`) or a bare error
/// object. Message, code, and type are each an independent sufficient
/// condition for the expiry classification.
pub fn classify_error(body: &Value) -> GraphError {
    let envelope = body.get("error").unwrap_or(body);

    let message = envelope
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown Graph API error")
        .to_string();

    // code sometimes arrives as a JSON string
    let code = envelope.get("code").and_then(|c| match c {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    });

    let error_type = envelope.get("type").and_then(Value::as_str).unwrap_or("");

    let expired = message.contains("Session has expired")
        || message.contains("expired")
        || code == Some(EXPIRED_SESSION_CODE)
        || error_type == AUTH_EXCEPTION_TYPE;

    if expired {
        GraphError::TokenExpired { message, code }
    } else {
        GraphError::Api(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn code_190_classifies_as_expired_regardless_of_message() {
        let body = json!({
            "error": {
                "message": "Invalid OAuth access token.",
                "type": "OAuthException",
                "code": 190
            }
        });
        let err = classify_error(&body);
        assert!(err.is_token_expired());
    }

    #[test]
    fn message_substring_is_an_independent_sufficient_condition() {
        let body = json!({
            "error": {
                "message": "Error validating access token: Session has expired on Monday",
                "code": 463
            }
        });
        assert!(classify_error(&body).is_token_expired());

        // lowercase "expired" alone is enough, whatever the code
        let body = json!({ "error": { "message": "token expired", "code": 1 } });
        assert!(classify_error(&body).is_token_expired());

        // the match is case-sensitive
        let body = json!({ "error": { "message": "Token EXPIRED", "code": 1 } });
        assert!(!classify_error(&body).is_token_expired());
    }

    #[test]
    fn auth_exception_type_alone_is_sufficient() {
        let body = json!({
            "error": { "message": "Unsupported request", "type": "OAuthException", "code": 100 }
        });
        assert!(classify_error(&body).is_token_expired());
    }

    #[test]
    fn other_failures_classify_as_generic_api_errors() {
        let body = json!({
            "error": {
                "message": "(#17) User request limit reached",
                "type": "ApiError",
                "code": 17
            }
        });
        match classify_error(&body) {
            GraphError::Api(message) => assert!(message.contains("request limit")),
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn string_codes_and_bare_envelopes_are_tolerated() {
        let body = json!({ "message": "whatever", "code": "190" });
        assert!(classify_error(&body).is_token_expired());

        let body = json!({ "something": "else" });
        match classify_error(&body) {
            GraphError::Api(message) => assert_eq!(message, "unknown Graph API error"),
            other => panic!("expected Api, got {other:?}"),
        }
    }
}
