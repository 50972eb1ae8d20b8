use std::sync::Arc;

use async_trait::async_trait;
use push_contract::PushSubscription;

use crate::domain::{
    ports::{
        inbound::PushService,
        outbound::{PushTransport, SubscriptionStore},
    },
    NotificationDispatcher, PushError, SubscriptionRelay, TransportError,
};

/// Implementation of the PushService inbound port.
///
/// Combines the subscription relay with the notification dispatcher and
/// prunes the stored subscription when the push service reports it gone.
pub struct PushServiceImpl<S, T> {
    relay: SubscriptionRelay<S>,
    dispatcher: NotificationDispatcher<T>,
}

impl<S: SubscriptionStore, T: PushTransport> PushServiceImpl<S, T> {
    pub fn new(store: Arc<S>, transport: Arc<T>) -> Self {
        Self {
            relay: SubscriptionRelay::new(store),
            dispatcher: NotificationDispatcher::new(transport),
        }
    }
}

#[async_trait]
impl<S: SubscriptionStore, T: PushTransport> PushService for PushServiceImpl<S, T> {
    async fn subscribe(&self, subscription: PushSubscription) -> Result<(), PushError> {
        self.relay.subscribe(&subscription).await
    }

    async fn unsubscribe(&self) -> Result<(), PushError> {
        self.relay.unsubscribe().await
    }

    async fn current(&self) -> Result<Option<PushSubscription>, PushError> {
        self.relay.current().await
    }

    async fn send(
        &self,
        subscription: Option<PushSubscription>,
        message: &str,
    ) -> Result<(), PushError> {
        let target = match subscription {
            Some(explicit) => {
                explicit.validate()?;
                Some(explicit)
            }
            None => self.relay.current().await?,
        };

        match self.dispatcher.send(target.as_ref(), message).await {
            Err(PushError::TransportFailure(TransportError::EndpointGone)) => {
                if let Some(dead) = &target {
                    self.relay.prune(dead).await?;
                }
                Err(PushError::SubscriptionExpired)
            }
            result => result,
        }
    }
}
