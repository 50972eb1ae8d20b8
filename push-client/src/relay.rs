use async_trait::async_trait;
use push_contract::{ApplicationServerKey, PushSubscription};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::ClientError;

pub const SUBSCRIPTION_EXPIRED_CODE: &str = "SUBSCRIPTION_EXPIRED";

/// Body of every relay action, on success and on failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl ActionOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            code: None,
        }
    }

    pub fn failed(error: &str, code: &str) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            code: Some(code.to_string()),
        }
    }

    pub fn into_result(self) -> Result<(), ClientError> {
        if self.success {
            return Ok(());
        }

        let message = self.error.unwrap_or_else(|| "unknown error".to_string());
        match self.code.as_deref() {
            Some(SUBSCRIPTION_EXPIRED_CODE) => Err(ClientError::SubscriptionExpired(message)),
            _ => Err(ClientError::Rejected(message)),
        }
    }
}

#[async_trait]
pub trait RelayApi: Send + Sync {
    async fn subscribe(
        &self,
        subscription: &PushSubscription,
    ) -> Result<ActionOutcome, ClientError>;
    async fn unsubscribe(&self) -> Result<ActionOutcome, ClientError>;
    async fn send(
        &self,
        subscription: &PushSubscription,
        message: &str,
    ) -> Result<ActionOutcome, ClientError>;
}

#[derive(Serialize)]
struct SendRequest<'a> {
    message: &'a str,
    subscription: &'a PushSubscription,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VapidPublicKey {
    public_key: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/notifications{}", self.base_url, path)
    }

    /// GET /notifications/vapid-public-key
    pub async fn vapid_public_key(&self) -> Result<ApplicationServerKey, ClientError> {
        let resp = self.client.get(self.url("/vapid-public-key")).send().await?;
        resp.error_for_status_ref()?;
        let body = resp.json::<VapidPublicKey>().await?;
        Ok(ApplicationServerKey::from_base64url(&body.public_key)?)
    }
}

/// Failures carry `{ success: false, error }` with a non-2xx status, so the
/// body is read whatever the status.
async fn read_outcome(resp: Response) -> Result<ActionOutcome, ClientError> {
    let status = resp.status();
    resp.json::<ActionOutcome>()
        .await
        .map_err(|e| ClientError::Relay(format!("{status}: {e}")))
}

#[async_trait]
impl RelayApi for ApiClient {
    async fn subscribe(
        &self,
        subscription: &PushSubscription,
    ) -> Result<ActionOutcome, ClientError> {
        let resp = self
            .client
            .post(self.url("/subscribe"))
            .json(subscription)
            .send()
            .await?;
        read_outcome(resp).await
    }

    async fn unsubscribe(&self) -> Result<ActionOutcome, ClientError> {
        let resp = self.client.delete(self.url("/subscribe")).send().await?;
        read_outcome(resp).await
    }

    async fn send(
        &self,
        subscription: &PushSubscription,
        message: &str,
    ) -> Result<ActionOutcome, ClientError> {
        let resp = self
            .client
            .post(self.url("/send"))
            .json(&SendRequest {
                message,
                subscription,
            })
            .send()
            .await?;
        read_outcome(resp).await
    }
}
