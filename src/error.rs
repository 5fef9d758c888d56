// Error handling module
// Defines the failure taxonomy surfaced to callers

use bytes::Bytes;
use thiserror::Error;

/// Errors that can occur while executing an API call
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (DNS, connection refused, timeout)
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The token endpoint rejected the client-credentials grant
    #[error("authentication failed: {message}")]
    Auth {
        /// HTTP status returned by the token endpoint, if it answered
        status: Option<u16>,
        message: String,
    },

    /// The API rejected the request with an error response
    #[error("Tropipay API error: {status} - {message}")]
    Api {
        status: u16,
        /// Machine-readable error code, when the endpoint provides one
        code: Option<String>,
        message: String,
        /// Raw response body, kept for diagnostics
        body: Bytes,
    },

    /// A 2xx response body did not match the expected shape
    #[error("failed to decode response body: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        /// Raw response body, kept for diagnostics
        body: Bytes,
    },

    /// The request body could not be serialized to JSON
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// Invalid construction-time configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status attached to the failure, when the server answered.
    ///
    /// 429 and 5xx responses are surfaced without any automatic retry;
    /// backoff policy belongs to the caller.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Auth { status, .. } => *status,
            _ => None,
        }
    }
}

/// Build an [`Error::Api`] from a non-2xx response, probing the body for the
/// shapes the platform uses across endpoints.
pub(crate) fn api_error(status: u16, body: Bytes) -> Error {
    let (code, message) = probe_error_body(&body);
    Error::Api {
        status,
        code,
        message: message.unwrap_or_else(|| format!("HTTP {status}")),
        body,
    }
}

/// Best-effort extraction of `(code, message)` from an error payload.
///
/// Endpoints disagree on the envelope: some return `{"message": ...}` with an
/// optional `"code"`, some wrap it as `{"error": {...}}` or a bare
/// `{"error": "..."}` string, and GraphQL-shaped responses carry an
/// `{"errors": [{"message": ...}]}` array.
pub(crate) fn probe_error_body(body: &[u8]) -> (Option<String>, Option<String>) {
    let value: serde_json::Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) => return (None, None),
    };

    let as_string = |v: &serde_json::Value| v.as_str().map(str::to_owned);

    let code = value
        .get("code")
        .and_then(|v| match v {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .or_else(|| {
            value
                .get("error")
                .and_then(|e| e.get("code"))
                .and_then(&as_string)
        });

    let message = value
        .get("message")
        .and_then(&as_string)
        .or_else(|| value.get("error").and_then(&as_string))
        .or_else(|| {
            value
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(&as_string)
        })
        .or_else(|| {
            value
                .get("errors")
                .and_then(|e| e.get(0))
                .and_then(|e| e.get("message"))
                .and_then(&as_string)
        });

    (code, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(body: &str) -> Error {
        api_error(422, Bytes::copy_from_slice(body.as_bytes()))
    }

    #[test]
    fn probes_flat_message() {
        match api(r#"{"message":"invalid account"}"#) {
            Error::Api { status, code, message, .. } => {
                assert_eq!(status, 422);
                assert_eq!(code, None);
                assert_eq!(message, "invalid account");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn probes_message_with_code() {
        match api(r#"{"code":"E_LIMIT","message":"limit exceeded"}"#) {
            Error::Api { code, message, .. } => {
                assert_eq!(code.as_deref(), Some("E_LIMIT"));
                assert_eq!(message, "limit exceeded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn probes_numeric_code() {
        match api(r#"{"code":4022,"message":"rejected"}"#) {
            Error::Api { code, .. } => assert_eq!(code.as_deref(), Some("4022")),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn probes_error_string() {
        match api(r#"{"error":"forbidden"}"#) {
            Error::Api { message, .. } => assert_eq!(message, "forbidden"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn probes_nested_error_object() {
        match api(r#"{"error":{"code":"E_AUTH","message":"bad grant"}}"#) {
            Error::Api { code, message, .. } => {
                assert_eq!(code.as_deref(), Some("E_AUTH"));
                assert_eq!(message, "bad grant");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn probes_graphql_errors_array() {
        match api(r#"{"errors":[{"message":"first"},{"message":"second"}]}"#) {
            Error::Api { message, .. } => assert_eq!(message, "first"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_body_falls_back_to_status() {
        match api("<html>502 Bad Gateway</html>") {
            Error::Api { code, message, body, .. } => {
                assert_eq!(code, None);
                assert_eq!(message, "HTTP 422");
                assert_eq!(&body[..], b"<html>502 Bad Gateway</html>");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn status_helper() {
        assert_eq!(api(r#"{}"#).status(), Some(422));
        assert_eq!(
            Error::Auth {
                status: Some(400),
                message: "bad credentials".to_string(),
            }
            .status(),
            Some(400)
        );
        assert_eq!(Error::Config("empty id".to_string()).status(), None);
    }

    #[test]
    fn display_formats() {
        let err = api(r#"{"message":"invalid account"}"#);
        assert_eq!(err.to_string(), "Tropipay API error: 422 - invalid account");

        let err = Error::Auth {
            status: Some(401),
            message: "invalid client".to_string(),
        };
        assert_eq!(err.to_string(), "authentication failed: invalid client");
    }
}
