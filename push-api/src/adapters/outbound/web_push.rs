//! Web push transport backed by the `web-push` crate.
//!
//! Encrypts the payload with `aes128gcm` for the subscription's keys and
//! signs the request with the application's VAPID key.

use async_trait::async_trait;
use push_contract::PushSubscription;
use web_push::{
    ContentEncoding, IsahcWebPushClient, SubscriptionInfo, SubscriptionKeys,
    VapidSignatureBuilder, WebPushClient, WebPushError, WebPushMessage, WebPushMessageBuilder,
    URL_SAFE,
};

use crate::domain::{ports::outbound::PushTransport, TransportError};

/// VAPID identity of this server.
#[derive(Clone)]
pub struct VapidDetails {
    /// `mailto:` or `https:` contact URI sent as the `sub` claim.
    pub subject: String,
    pub private_key: String,
    pub ttl_seconds: u32,
}

pub struct WebPushTransport {
    client: IsahcWebPushClient,
    vapid: VapidDetails,
}

impl WebPushTransport {
    pub fn new(vapid: VapidDetails) -> Result<Self, WebPushError> {
        Ok(Self {
            client: IsahcWebPushClient::new()?,
            vapid,
        })
    }

    fn build_message(
        &self,
        sub_info: &SubscriptionInfo,
        content: &[u8],
    ) -> Result<WebPushMessage, WebPushError> {
        let mut sig_builder =
            VapidSignatureBuilder::from_base64(&self.vapid.private_key, URL_SAFE, sub_info)?;
        sig_builder.add_claim("sub", self.vapid.subject.clone());
        let signature = sig_builder.build()?;

        let mut builder = WebPushMessageBuilder::new(sub_info);
        builder.set_payload(ContentEncoding::Aes128Gcm, content);
        builder.set_ttl(self.vapid.ttl_seconds);
        builder.set_vapid_signature(signature);

        builder.build()
    }
}

#[async_trait]
impl PushTransport for WebPushTransport {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        tracing::debug!(
            "Delivering {} bytes to push service {}",
            payload.len(),
            subscription.audience().unwrap_or_default()
        );
        let sub_info = subscription_info(subscription);
        let message = self
            .build_message(&sub_info, payload)
            .map_err(transport_error)?;

        self.client.send(message).await.map_err(transport_error)
    }
}

fn subscription_info(subscription: &PushSubscription) -> SubscriptionInfo {
    SubscriptionInfo {
        endpoint: subscription.endpoint.clone(),
        keys: SubscriptionKeys {
            p256dh: subscription.keys.p256dh.clone(),
            auth: subscription.keys.auth.clone(),
        },
    }
}

fn transport_error(err: WebPushError) -> TransportError {
    match &err {
        // 404 and 410 from the push service
        WebPushError::EndpointNotFound { .. } | WebPushError::EndpointNotValid { .. } => {
            TransportError::EndpointGone
        }
        WebPushError::InvalidUri { .. }
        | WebPushError::MissingCryptoKeys { .. }
        | WebPushError::InvalidCryptoKeys { .. } => {
            TransportError::InvalidSubscription(err.to_string())
        }
        _ => TransportError::Rejected(err.to_string()),
    }
}
