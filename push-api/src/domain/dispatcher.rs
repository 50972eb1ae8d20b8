use std::sync::Arc;

use push_contract::{NotificationPayload, PushSubscription};
use time::OffsetDateTime;

use super::{ports::outbound::PushTransport, PushError};

/// Builds the notification payload for a message and hands it to the transport.
pub struct NotificationDispatcher<T> {
    transport: Arc<T>,
}

impl<T: PushTransport> NotificationDispatcher<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Exactly one transport call per successful payload build; none without a subscription.
    pub async fn send(
        &self,
        subscription: Option<&PushSubscription>,
        message: &str,
    ) -> Result<(), PushError> {
        let subscription = subscription.ok_or(PushError::NoActiveSubscription)?;

        let payload = NotificationPayload::for_message(message, now_millis());
        let content = payload.to_json_bytes()?;

        self.transport
            .send(subscription, &content)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to send notification to {}: {}",
                    subscription.endpoint,
                    e
                );
                PushError::from(e)
            })?;

        tracing::info!("Notification sent to {}", subscription.endpoint);
        Ok(())
    }
}

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
