//! Errors raised by the Airtable REST client

use super::resilience::RetryableError;

/// Failure talking to the Airtable REST API
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Non-success HTTP status with the message Airtable returned
    Http { status: u16, message: String },
    /// Request never produced a response (DNS, TLS, timeout, ...)
    Transport(String),
    /// Response body didn't match the expected shape
    Decode(String),
    /// The base schema has no table with this ID
    TableNotFound { base_id: String, table_id: String },
    /// Internal limiter was shut down
    Unavailable(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Http { status, message } => {
                write!(f, "Airtable responded with HTTP {}: {}", status, message)
            }
            ApiError::Transport(message) => write!(f, "Request to Airtable failed: {}", message),
            ApiError::Decode(message) => {
                write!(f, "Could not decode Airtable response: {}", message)
            }
            ApiError::TableNotFound { base_id, table_id } => {
                write!(f, "Table '{}' was not found in base '{}'", table_id, base_id)
            }
            ApiError::Unavailable(message) => write!(f, "Airtable client unavailable: {}", message),
        }
    }
}

impl std::error::Error for ApiError {}

impl RetryableError for ApiError {
    fn is_retryable(&self) -> bool {
        match self {
            ApiError::Http { status, .. } => *status == 429 || *status >= 500,
            ApiError::Transport(_) => true,
            ApiError::Decode(_) | ApiError::TableNotFound { .. } | ApiError::Unavailable(_) => {
                false
            }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Pull the human-readable message out of an Airtable error body.
///
/// Airtable uses both `{"error": {"type", "message"}}` and `{"error": "TYPE"}`.
pub fn extract_error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|value| value.get("error"));

    match error {
        Some(serde_json::Value::String(kind)) => kind.clone(),
        Some(serde_json::Value::Object(obj)) => {
            let kind = obj.get("type").and_then(|v| v.as_str());
            let message = obj.get("message").and_then(|v| v.as_str());
            match (kind, message) {
                (Some(kind), Some(message)) => format!("{} ({})", message, kind),
                (None, Some(message)) => message.to_string(),
                (Some(kind), None) => kind.to_string(),
                (None, None) => body.to_string(),
            }
        }
        _ if body.trim().is_empty() => "empty response body".to_string(),
        _ => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        let rate_limited = ApiError::Http {
            status: 429,
            message: String::new(),
        };
        let server_error = ApiError::Http {
            status: 503,
            message: String::new(),
        };
        let forbidden = ApiError::Http {
            status: 403,
            message: String::new(),
        };

        assert!(rate_limited.is_retryable());
        assert!(server_error.is_retryable());
        assert!(!forbidden.is_retryable());
        assert!(ApiError::Transport("reset".into()).is_retryable());
        assert!(!ApiError::Decode("bad json".into()).is_retryable());
    }

    #[test]
    fn test_extract_error_message_shapes() {
        assert_eq!(
            extract_error_message(
                r#"{"error":{"type":"INVALID_FILTER_BY_FORMULA","message":"Unknown field"}}"#
            ),
            "Unknown field (INVALID_FILTER_BY_FORMULA)"
        );
        assert_eq!(extract_error_message(r#"{"error":"NOT_FOUND"}"#), "NOT_FOUND");
        assert_eq!(extract_error_message(""), "empty response body");
        assert_eq!(extract_error_message("Bad Gateway"), "Bad Gateway");
    }
}
