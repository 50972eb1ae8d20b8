use push_contract::{KeyError, SubscriptionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("notification permission denied")]
    PermissionDenied,
    #[error("no active subscription")]
    NoActiveSubscription,
    #[error(transparent)]
    InvalidSubscription(#[from] SubscriptionError),
    #[error(transparent)]
    InvalidKey(#[from] KeyError),
    #[error("serialization fault: {0}")]
    SerializationFault(String),
    #[error("{0}")]
    Rejected(String),
    /// The relay found the push channel dead and dropped it.
    #[error("{0}")]
    SubscriptionExpired(String),
    #[error("relay request failed: {0}")]
    Relay(String),
    #[error("{0}")]
    Platform(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationFault(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Relay(err.to_string())
    }
}
