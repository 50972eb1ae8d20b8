//! Service worker registration and push subscription.

use async_trait::async_trait;
use push_contract::{ApplicationServerKey, PushSubscription};

use crate::ClientError;

pub const SERVICE_WORKER_SCRIPT: &str = "/sw.js";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateViaCache {
    Imports,
    All,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOptions {
    pub scope: String,
    pub update_via_cache: UpdateViaCache,
}

impl Default for RegistrationOptions {
    /// Root scope, and the worker script is never served from the HTTP cache.
    fn default() -> Self {
        Self {
            scope: "/".to_string(),
            update_via_cache: UpdateViaCache::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeOptions {
    pub user_visible_only: bool,
    /// Raw key bytes, never the base64url text.
    pub application_server_key: ApplicationServerKey,
}

impl SubscribeOptions {
    pub fn new(application_server_key: ApplicationServerKey) -> Self {
        Self {
            user_visible_only: true,
            application_server_key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Default,
    Granted,
    Denied,
}

/// Feature detection for the two browser APIs web push depends on.
pub trait BrowserCapabilities: Send + Sync {
    fn has_service_worker(&self) -> bool;
    fn has_push_manager(&self) -> bool;
}

/// Push works only when the page can both register a worker and subscribe.
pub fn push_supported(capabilities: &dyn BrowserCapabilities) -> bool {
    capabilities.has_service_worker() && capabilities.has_push_manager()
}

#[async_trait]
pub trait ServiceWorkerContainer: Send + Sync {
    async fn register(
        &self,
        script_url: &str,
        options: &RegistrationOptions,
    ) -> Result<(), ClientError>;
}

#[async_trait]
pub trait NotificationPermissions: Send + Sync {
    async fn request_permission(&self) -> Permission;
}

#[async_trait]
pub trait PushManager: Send + Sync {
    async fn subscribe(&self, options: &SubscribeOptions) -> Result<PushSubscription, ClientError>;

    /// Resolves to `false` when there was nothing to unsubscribe.
    async fn unsubscribe(&self) -> Result<bool, ClientError>;
}

pub async fn register_service_worker(
    container: &dyn ServiceWorkerContainer,
) -> Result<(), ClientError> {
    container
        .register(SERVICE_WORKER_SCRIPT, &RegistrationOptions::default())
        .await?;
    tracing::info!("Service worker registered: {}", SERVICE_WORKER_SCRIPT);
    Ok(())
}

/// Asks for notification permission and subscribes with the application
/// server key. Nothing is subscribed unless permission is granted.
pub async fn register_push(
    permissions: &dyn NotificationPermissions,
    push_manager: &dyn PushManager,
    application_server_key: &ApplicationServerKey,
) -> Result<PushSubscription, ClientError> {
    let permission = permissions.request_permission().await;
    if permission != Permission::Granted {
        tracing::warn!("Notification permission not granted: {:?}", permission);
        return Err(ClientError::PermissionDenied);
    }

    let subscription = push_manager
        .subscribe(&SubscribeOptions::new(application_server_key.clone()))
        .await?;
    subscription.validate()?;

    tracing::info!("New push subscription: {}", subscription.endpoint);
    Ok(subscription)
}
