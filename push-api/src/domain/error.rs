use push_contract::{PayloadError, SubscriptionError};
use thiserror::Error;

/// Errors raised by a subscription store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("subscription store unavailable: {0}")]
    Unavailable(String),
    #[error("stored subscription is corrupt: {0}")]
    Corrupt(String),
}

/// Errors raised while handing a message to the push service.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The push service answered 404/410: the subscription is dead.
    #[error("push endpoint is no longer valid")]
    EndpointGone,
    #[error("subscription cannot be used for delivery: {0}")]
    InvalidSubscription(String),
    #[error("push service rejected the message: {0}")]
    Rejected(String),
}

/// Errors that can occur while relaying subscriptions and notifications.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("no active subscription")]
    NoActiveSubscription,
    #[error(transparent)]
    InvalidSubscription(#[from] SubscriptionError),
    #[error("subscription expired and was removed")]
    SubscriptionExpired,
    #[error("failed to deliver notification: {0}")]
    TransportFailure(#[source] TransportError),
    #[error(transparent)]
    SerializationFault(#[from] PayloadError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TransportError> for PushError {
    fn from(err: TransportError) -> Self {
        Self::TransportFailure(err)
    }
}
