//! Flight-following subscriptions.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::classify::{classify, ClassifiedError, Failure};

/// Length of a generated subscription id.
const SUBSCRIPTION_ID_LEN: usize = 8;

/// Rejection message when either input is blank.
pub const MISSING_INPUT_MESSAGE: &str = "Flight number and email are required";

/// Rejection message for a malformed address.
pub const INVALID_EMAIL_MESSAGE: &str = "Invalid email format";

/// Lifecycle state of a subscription.
///
/// A missing or `null` status reads as [`SubscriptionStatus::Active`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum SubscriptionStatus {
    /// Notifications will be sent.
    #[default]
    Active,
    /// The subscription exists but is not sending notifications.
    Inactive,
    /// A state reported by the server that this client does not know.
    Other(String),
}

impl From<Option<String>> for SubscriptionStatus {
    fn from(value: Option<String>) -> Self {
        match value {
            None => Self::Active,
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "active" => Self::Active,
                "inactive" => Self::Inactive,
                _ => Self::Other(value),
            },
        }
    }
}

impl From<SubscriptionStatus> for String {
    fn from(status: SubscriptionStatus) -> Self {
        status.to_string()
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// A user's request to be notified about one flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// The followed flight.
    #[serde(default)]
    pub flight_number: String,
    /// Where notifications go.
    #[serde(default)]
    pub email: String,
    /// Server-assigned or generated identifier.
    #[serde(
        default = "generate_subscription_id",
        deserialize_with = "deserialize_subscription_id"
    )]
    pub subscription_id: String,
    /// Current state.
    #[serde(default)]
    pub status: SubscriptionStatus,
    /// When the subscription was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Create an active subscription with a fresh id.
    #[must_use]
    pub fn new(flight_number: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            flight_number: flight_number.into(),
            email: email.into(),
            subscription_id: generate_subscription_id(),
            status: SubscriptionStatus::Active,
            created_at: Utc::now(),
        }
    }

    /// Whether notifications are being sent.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}

/// Body of a follow request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest<'a> {
    /// The flight to follow.
    pub flight_number: &'a str,
    /// Where notifications go.
    pub email: &'a str,
}

/// Generate a short random lowercase alphanumeric id.
#[must_use]
pub fn generate_subscription_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(SUBSCRIPTION_ID_LEN);
    id
}

/// Accept a string or numeric id; a `null` or empty id gets a generated one.
fn deserialize_subscription_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(generate_subscription_id()),
        Some(Value::String(id)) if id.trim().is_empty() => Ok(generate_subscription_id()),
        Some(Value::String(id)) => Ok(id),
        Some(Value::Number(id)) => Ok(id.to_string()),
        Some(other) => Err(D::Error::custom(format!(
            "subscriptionId must be a string or a number, got {other}"
        ))),
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

/// Whether `email` looks like `local@domain.tld`.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Check follow-request input before anything touches the network.
///
/// # Errors
///
/// Returns a [`crate::classify::ErrorKind::Validation`] error when either field
/// is blank or the email is malformed.
pub fn validate_follow_input(
    flight_number: &str,
    email: &str,
    context: &str,
) -> Result<(), ClassifiedError> {
    if flight_number.trim().is_empty() || email.trim().is_empty() {
        return Err(classify(
            Failure::Invalid(MISSING_INPUT_MESSAGE.to_string()),
            context,
        ));
    }
    if !is_valid_email(email) {
        return Err(classify(
            Failure::Invalid(INVALID_EMAIL_MESSAGE.to_string()),
            context,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ErrorKind;

    #[test]
    fn test_generated_id_shape() {
        let id = generate_subscription_id();
        assert_eq!(id.len(), SUBSCRIPTION_ID_LEN);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(id, generate_subscription_id());
    }

    #[test]
    fn test_new_subscription_is_active() {
        let sub = Subscription::new("AF101", "jo@example.com");
        assert!(sub.is_active());
        assert_eq!(sub.flight_number, "AF101");
    }

    #[test]
    fn test_email_check() {
        assert!(is_valid_email("jo@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("jo@example"));
        assert!(!is_valid_email("jo example@mail.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("jo@@example.com"));
    }

    #[test]
    fn test_validate_missing_fields() {
        let err = validate_follow_input("", "jo@example.com", "follow_flight").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, MISSING_INPUT_MESSAGE);

        let err = validate_follow_input("AF101", "  ", "follow_flight").unwrap_err();
        assert_eq!(err.message, MISSING_INPUT_MESSAGE);
    }

    #[test]
    fn test_validate_bad_email() {
        let err = validate_follow_input("AF101", "not-an-email", "follow_flight").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, INVALID_EMAIL_MESSAGE);
    }

    #[test]
    fn test_validate_ok() {
        assert!(validate_follow_input("AF101", "jo@example.com", "follow_flight").is_ok());
    }

    #[test]
    fn test_subscription_wire_format() {
        let sub = Subscription::new("AF101", "jo@example.com");
        let value = serde_json::to_value(&sub).unwrap();
        assert_eq!(value["flightNumber"], "AF101");
        assert_eq!(value["status"], "active");
        assert!(value["subscriptionId"].is_string());
    }

    #[test]
    fn test_subscription_accepts_loose_server_fields() {
        let sub: Subscription =
            serde_json::from_str(r#"{"subscriptionId":42,"status":"pending"}"#).unwrap();
        assert_eq!(sub.subscription_id, "42");
        assert_eq!(sub.status, SubscriptionStatus::Other("pending".to_string()));
        assert!(!sub.is_active());

        let sub: Subscription =
            serde_json::from_str(r#"{"subscriptionId":null,"status":null}"#).unwrap();
        assert_eq!(sub.subscription_id.len(), SUBSCRIPTION_ID_LEN);
        assert!(sub.is_active());

        let sub: Subscription = serde_json::from_str(r#"{"status":"INACTIVE"}"#).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Inactive);
    }

    #[test]
    fn test_subscription_rejects_structured_id() {
        let err = serde_json::from_str::<Subscription>(r#"{"subscriptionId":{"id":1}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("subscriptionId must be a string or a number"));
    }

    #[test]
    fn test_subscription_fills_missing_server_fields() {
        let sub: Subscription =
            serde_json::from_str(r#"{"flightNumber":"AF101","email":"jo@example.com"}"#).unwrap();
        assert_eq!(sub.subscription_id.len(), SUBSCRIPTION_ID_LEN);
        assert!(sub.is_active());
    }
}
