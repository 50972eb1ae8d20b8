use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::encoding::decode_base64url;

/// Length of an uncompressed P-256 public key (`0x04 || X || Y`).
pub const P256DH_KEY_LEN: usize = 65;
pub const AUTH_SECRET_LEN: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("malformed subscription: {0}")]
    Malformed(String),
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("invalid {field} key: {reason}")]
    InvalidKey { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A push channel handed out by the platform push service for one
/// browser registration. Serializes to the shape of `PushSubscription.toJSON()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    #[serde(default)]
    pub expiration_time: Option<i64>,
    pub keys: SubscriptionKeys,
}

impl PushSubscription {
    pub fn new(endpoint: &str, p256dh: &str, auth: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            expiration_time: None,
            keys: SubscriptionKeys {
                p256dh: p256dh.to_string(),
                auth: auth.to_string(),
            },
        }
    }

    /// Parses and validates a subscription received over the wire.
    pub fn parse(json: &str) -> Result<Self, SubscriptionError> {
        let subscription: Self = serde_json::from_str(json)
            .map_err(|e| SubscriptionError::Malformed(e.to_string()))?;
        subscription.validate()?;
        Ok(subscription)
    }

    pub fn validate(&self) -> Result<(), SubscriptionError> {
        validate_endpoint(&self.endpoint)?;
        validate_key("p256dh", &self.keys.p256dh, P256DH_KEY_LEN)?;

        let p256dh = decode_base64url(&self.keys.p256dh).unwrap_or_default();
        if p256dh.first() != Some(&0x04) {
            return Err(SubscriptionError::InvalidKey {
                field: "p256dh",
                reason: "not an uncompressed P-256 point".to_string(),
            });
        }

        validate_key("auth", &self.keys.auth, AUTH_SECRET_LEN)
    }

    /// True when both values address the same push channel, ignoring expiry.
    pub fn same_channel(&self, other: &PushSubscription) -> bool {
        self.endpoint == other.endpoint && self.keys == other.keys
    }

    /// Origin of the push service, used as the VAPID audience.
    pub fn audience(&self) -> Option<String> {
        Url::parse(&self.endpoint)
            .ok()
            .map(|url| url.origin().ascii_serialization())
    }
}

fn validate_endpoint(endpoint: &str) -> Result<(), SubscriptionError> {
    let invalid = |reason: &str| SubscriptionError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(endpoint).map_err(|e| invalid(&e.to_string()))?;
    let host = url.host_str().ok_or_else(|| invalid("missing host"))?;

    match url.scheme() {
        "https" => Ok(()),
        "http" if matches!(host, "localhost" | "127.0.0.1") => Ok(()),
        scheme => Err(invalid(&format!("unsupported scheme '{scheme}'"))),
    }
}

fn validate_key(
    field: &'static str,
    value: &str,
    expected_len: usize,
) -> Result<(), SubscriptionError> {
    if value.trim().is_empty() {
        return Err(SubscriptionError::InvalidKey {
            field,
            reason: "missing".to_string(),
        });
    }

    let bytes = decode_base64url(value).map_err(|e| SubscriptionError::InvalidKey {
        field,
        reason: e.to_string(),
    })?;

    if bytes.len() != expected_len {
        return Err(SubscriptionError::InvalidKey {
            field,
            reason: format!("expected {expected_len} bytes, got {}", bytes.len()),
        });
    }

    Ok(())
}
