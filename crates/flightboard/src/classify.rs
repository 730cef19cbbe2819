//! Failure classification.
//!
//! Every failure raised while talking to a data source is reduced to one of a
//! small, fixed set of [`ErrorKind`]s. The kind decides the label, the default
//! message and the text shown to the user; the original failure text is kept in
//! [`ClassifiedError::details`] for logs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::error;

/// Text carried by a request aborted by the client-side timeout.
pub const TIMEOUT_MESSAGE: &str = "Request timeout";

/// The category a failure falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// The server answered with a non-success HTTP status.
    #[serde(rename = "API_ERROR")]
    Api,
    /// The request went out but no response came back (connect failure, timeout).
    #[serde(rename = "NETWORK_ERROR")]
    Network,
    /// A payload could not be parsed as JSON.
    #[serde(rename = "JSON_LOAD_ERROR")]
    JsonLoad,
    /// Well-formed data or user input failed a shape or content check.
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    /// Anything else.
    #[serde(rename = "UNKNOWN_ERROR")]
    Unknown,
}

impl ErrorKind {
    /// All kinds, in table order.
    pub const ALL: [ErrorKind; 5] = [
        Self::Api,
        Self::Network,
        Self::JsonLoad,
        Self::Validation,
        Self::Unknown,
    ];

    /// Stable label, e.g. `API_ERROR`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Api => "API_ERROR",
            Self::Network => "NETWORK_ERROR",
            Self::JsonLoad => "JSON_LOAD_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Message used when the failure itself does not supply a better one.
    #[must_use]
    pub fn default_message(self) -> &'static str {
        match self {
            Self::Api => "Failed to fetch data from the API",
            Self::Network => "Network connection error. Please check your internet connection",
            Self::JsonLoad => "Failed to load local data",
            Self::Validation => "Invalid data format",
            Self::Unknown => "An unexpected error occurred",
        }
    }

    /// Text suitable for showing to an end user.
    #[must_use]
    pub fn user_friendly_message(self) -> &'static str {
        match self {
            Self::Api => "Unable to fetch data from the server. Please try again later.",
            Self::Network => "Network connection issue. Please check your internet connection.",
            Self::JsonLoad => "Unable to load flight data. Please refresh the page.",
            Self::Validation => "Invalid data received. Please contact support.",
            Self::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The shape of a caught failure, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// A response arrived with a non-success status.
    Response {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// The request was sent but nothing usable came back.
    Request(String),
    /// The request was aborted by the client-side timeout.
    Timeout,
    /// A payload was not valid JSON.
    Parse(String),
    /// A payload or an input value failed validation.
    Invalid(String),
    /// Anything else; an empty string falls back to the default message.
    Other(String),
}

impl From<reqwest::Error> for Failure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else if err.is_connect() || err.is_request() || err.is_body() || err.is_redirect() {
            Self::Request(err.to_string())
        } else {
            Self::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            Self::Invalid(err.to_string())
        } else {
            Self::Parse(err.to_string())
        }
    }
}

/// A failure after classification: what gets returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{kind}: {message}")]
pub struct ClassifiedError {
    /// The category.
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    /// Message for logs and API consumers.
    pub message: String,
    /// HTTP status, for [`ErrorKind::Api`] only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Raw failure information.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// The operation that failed.
    pub context: String,
    /// When the failure was classified.
    pub timestamp: DateTime<Utc>,
}

impl ClassifiedError {
    /// Text suitable for showing to an end user.
    #[must_use]
    pub fn user_friendly_message(&self) -> &'static str {
        self.kind.user_friendly_message()
    }

    /// Whether this failure came from the client-side timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Network
            && self.details.as_ref().and_then(Value::as_str) == Some(TIMEOUT_MESSAGE)
    }
}

/// Classify a failure raised while running `context` and log it.
#[must_use]
pub fn classify(failure: Failure, context: &str) -> ClassifiedError {
    let classified = classify_quiet(failure, context);
    error!(
        context = %classified.context,
        kind = %classified.kind,
        status = ?classified.status,
        details = ?classified.details,
        "Error in {}: {}",
        classified.context,
        classified.message
    );
    classified
}

fn classify_quiet(failure: Failure, context: &str) -> ClassifiedError {
    let (kind, message, status, details) = match failure {
        Failure::Response { status, body } => {
            let details = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
            let message = details
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .map_or_else(|| ErrorKind::Api.default_message().to_string(), str::to_string);
            (ErrorKind::Api, message, Some(status), Some(details))
        }
        Failure::Request(text) => (
            ErrorKind::Network,
            ErrorKind::Network.default_message().to_string(),
            None,
            Some(Value::String(text)),
        ),
        Failure::Timeout => (
            ErrorKind::Network,
            ErrorKind::Network.default_message().to_string(),
            None,
            Some(Value::String(TIMEOUT_MESSAGE.to_string())),
        ),
        Failure::Parse(text) => (
            ErrorKind::JsonLoad,
            ErrorKind::JsonLoad.default_message().to_string(),
            None,
            Some(Value::String(text)),
        ),
        Failure::Invalid(text) => (ErrorKind::Validation, text, None, None),
        Failure::Other(text) => {
            let message = if text.is_empty() {
                ErrorKind::Unknown.default_message().to_string()
            } else {
                text.clone()
            };
            (ErrorKind::Unknown, message, None, Some(Value::String(text)))
        }
    };

    ClassifiedError {
        kind,
        message,
        status,
        details,
        context: context.to_string(),
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let labels: Vec<_> = ErrorKind::ALL.iter().map(|k| k.label()).collect();
        assert_eq!(
            labels,
            [
                "API_ERROR",
                "NETWORK_ERROR",
                "JSON_LOAD_ERROR",
                "VALIDATION_ERROR",
                "UNKNOWN_ERROR"
            ]
        );
    }

    #[test]
    fn test_kind_serializes_as_label() {
        for kind in ErrorKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.label()));
        }
    }

    #[test]
    fn test_user_friendly_messages() {
        assert_eq!(
            ErrorKind::Api.user_friendly_message(),
            "Unable to fetch data from the server. Please try again later."
        );
        assert_eq!(
            ErrorKind::Unknown.user_friendly_message(),
            "Something went wrong. Please try again."
        );
    }

    #[test]
    fn test_response_with_message_body() {
        let err = classify(
            Failure::Response {
                status: 503,
                body: r#"{"message":"maintenance"}"#.to_string(),
            },
            "get_departure_flights",
        );
        assert_eq!(err.kind, ErrorKind::Api);
        assert_eq!(err.status, Some(503));
        assert_eq!(err.message, "maintenance");
        assert_eq!(err.context, "get_departure_flights");
    }

    #[test]
    fn test_response_with_plain_body() {
        let err = classify(
            Failure::Response {
                status: 404,
                body: "not found".to_string(),
            },
            "ctx",
        );
        assert_eq!(err.kind, ErrorKind::Api);
        assert_eq!(err.message, "Failed to fetch data from the API");
        assert_eq!(err.details, Some(Value::String("not found".to_string())));
    }

    #[test]
    fn test_request_failure_is_network() {
        let err = classify(Failure::Request("connection refused".into()), "ctx");
        assert_eq!(err.kind, ErrorKind::Network);
        assert_eq!(err.status, None);
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_timeout_is_network() {
        let err = classify(Failure::Timeout, "ctx");
        assert_eq!(err.kind, ErrorKind::Network);
        assert!(err.is_timeout());
    }

    #[test]
    fn test_parse_failure() {
        let json_err = serde_json::from_str::<Value>("{not json").unwrap_err();
        let err = classify(Failure::from(json_err), "ctx");
        assert_eq!(err.kind, ErrorKind::JsonLoad);
        assert_eq!(err.message, "Failed to load local data");
    }

    #[test]
    fn test_data_mismatch_is_validation() {
        let json_err = serde_json::from_str::<Vec<String>>("[1, 2]").unwrap_err();
        let err = classify(Failure::from(json_err), "ctx");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_other_falls_back_to_default_message() {
        let err = classify(Failure::Other(String::new()), "ctx");
        assert_eq!(err.kind, ErrorKind::Unknown);
        assert_eq!(err.message, "An unexpected error occurred");

        let err = classify(Failure::Other("boom".into()), "ctx");
        assert_eq!(err.message, "boom");
    }

    #[test]
    fn test_classified_display() {
        let err = classify(Failure::Invalid("Invalid email format".into()), "follow_flight");
        assert_eq!(err.to_string(), "VALIDATION_ERROR: Invalid email format");
    }

    #[test]
    fn test_classified_serializes_type_field() {
        let err = classify(Failure::Timeout, "ctx");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "NETWORK_ERROR");
        assert_eq!(json["details"], TIMEOUT_MESSAGE);
        assert!(json.get("status").is_none());
    }
}
