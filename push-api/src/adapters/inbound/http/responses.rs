//! HTTP response types for the notification endpoints.
//!
//! These types serialize to the JSON format expected by the page.

use serde::Serialize;

/// Result of a subscribe, unsubscribe or send action.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
}

impl ActionResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VapidPublicKeyResponse {
    /// base64url, ready for `urlBase64ToUint8Array` style decoding on the page.
    pub public_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatusResponse {
    pub subscribed: bool,
    pub endpoint: Option<String>,
}
