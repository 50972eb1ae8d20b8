//! Push transport port (outbound).
//!
//! Performs the authenticated delivery of an already serialized payload
//! to the subscription's push service endpoint.

use async_trait::async_trait;
use push_contract::PushSubscription;

use crate::domain::TransportError;

#[async_trait]
pub trait PushTransport: Send + Sync + 'static {
    /// Deliver `payload` (JSON bytes) to the push service behind `subscription`.
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<(), TransportError>;
}
