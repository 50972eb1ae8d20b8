use std::sync::Arc;

use push_contract::PushSubscription;

use super::{ports::outbound::SubscriptionStore, PushError};

/// Keeps the single active subscription in a store.
pub struct SubscriptionRelay<S> {
    store: Arc<S>,
}

impl<S: SubscriptionStore> SubscriptionRelay<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn subscribe(&self, subscription: &PushSubscription) -> Result<(), PushError> {
        subscription.validate()?;
        self.store.set(subscription).await?;
        tracing::info!("User subscribed to notifications: {}", subscription.endpoint);
        Ok(())
    }

    pub async fn unsubscribe(&self) -> Result<(), PushError> {
        self.store.clear().await?;
        tracing::info!("User unsubscribed from notifications");
        Ok(())
    }

    pub async fn current(&self) -> Result<Option<PushSubscription>, PushError> {
        Ok(self.store.get().await?)
    }

    /// Drop the stored subscription if it is the one that just died.
    pub async fn prune(&self, dead: &PushSubscription) -> Result<bool, PushError> {
        match self.store.get().await? {
            Some(stored) if stored.same_channel(dead) => {
                self.store.clear().await?;
                tracing::warn!("Removed expired subscription: {}", dead.endpoint);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
