//! In-process subscription store.
//!
//! Lives as long as the server process; a restart forgets the subscription.

use async_trait::async_trait;
use push_contract::PushSubscription;
use tokio::sync::RwLock;

use crate::domain::{ports::outbound::SubscriptionStore, StoreError};

#[derive(Default)]
pub struct InMemorySubscriptionStore {
    subscription: RwLock<Option<PushSubscription>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn get(&self) -> Result<Option<PushSubscription>, StoreError> {
        Ok(self.subscription.read().await.clone())
    }

    async fn set(&self, subscription: &PushSubscription) -> Result<(), StoreError> {
        *self.subscription.write().await = Some(subscription.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.subscription.write().await.take();
        Ok(())
    }
}
