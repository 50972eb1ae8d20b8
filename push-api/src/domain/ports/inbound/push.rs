use async_trait::async_trait;
use push_contract::PushSubscription;

use crate::domain::PushError;

/// Inbound port for the push relay.
///
/// HTTP handlers talk to this trait only; the concrete service wires a
/// subscription store and a push transport together.
#[async_trait]
pub trait PushService: Send + Sync + 'static {
    /// Validate and store `subscription`, replacing any previous one.
    async fn subscribe(&self, subscription: PushSubscription) -> Result<(), PushError>;

    /// Forget the stored subscription.
    async fn unsubscribe(&self) -> Result<(), PushError>;

    /// The currently stored subscription.
    async fn current(&self) -> Result<Option<PushSubscription>, PushError>;

    /// Send `message` to `subscription`, or to the stored subscription when none is given.
    async fn send(
        &self,
        subscription: Option<PushSubscription>,
        message: &str,
    ) -> Result<(), PushError>;
}
