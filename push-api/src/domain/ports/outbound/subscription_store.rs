//! Subscription store port (outbound).
//!
//! Holds at most one subscription. The in-memory adapter stands in for
//! tests and single-process demos; the Postgres adapter keys the row by
//! owner so a restart does not lose the channel.

use async_trait::async_trait;
use push_contract::PushSubscription;

use crate::domain::StoreError;

#[async_trait]
pub trait SubscriptionStore: Send + Sync + 'static {
    /// Get the stored subscription, if any.
    async fn get(&self) -> Result<Option<PushSubscription>, StoreError>;

    /// Replace the stored subscription.
    async fn set(&self, subscription: &PushSubscription) -> Result<(), StoreError>;

    /// Forget the stored subscription. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<(), StoreError>;
}
