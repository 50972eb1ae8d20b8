//! Page flow: subscribe, unsubscribe and send a test notification.
//!
//! Every action catches its own failure, logs it and reports it through
//! [`PushController::status`]; nothing is propagated to the caller.

use std::sync::Arc;

use push_contract::{ApplicationServerKey, PushSubscription};

use crate::{
    registration::{
        push_supported, register_push, register_service_worker, BrowserCapabilities,
        NotificationPermissions, PushManager, ServiceWorkerContainer,
    },
    relay::RelayApi,
    storage::{KeyValueStorage, SubscriptionCache},
    ClientError,
};

pub const STATUS_SUBSCRIBING: &str = "Subscribing...";
pub const STATUS_SUBSCRIBED: &str = "Subscribed successfully!";
pub const STATUS_UNSUBSCRIBING: &str = "Cancelling subscription...";
pub const STATUS_UNSUBSCRIBED: &str = "Subscription cancelled!";
pub const STATUS_SENDING: &str = "Sending notification...";
pub const STATUS_SENT: &str = "Notification sent!";
pub const STATUS_NO_SUBSCRIPTION: &str = "No active subscription!";
pub const STATUS_EMPTY_MESSAGE: &str = "Write a message!";
pub const STATUS_UNSUPPORTED: &str = "Push notifications are not supported in this browser.";

/// Browser collaborators the page talks to.
#[derive(Clone)]
pub struct Platform {
    pub capabilities: Arc<dyn BrowserCapabilities>,
    pub service_worker: Arc<dyn ServiceWorkerContainer>,
    pub permissions: Arc<dyn NotificationPermissions>,
    pub push_manager: Arc<dyn PushManager>,
    pub storage: Arc<dyn KeyValueStorage>,
}

pub struct PushController {
    platform: Platform,
    relay: Arc<dyn RelayApi>,
    cache: SubscriptionCache,
    application_server_key: ApplicationServerKey,
    subscription: Option<PushSubscription>,
    status: String,
    is_loading: bool,
    is_supported: bool,
}

impl PushController {
    pub fn new(
        platform: Platform,
        relay: Arc<dyn RelayApi>,
        application_server_key: ApplicationServerKey,
    ) -> Self {
        let cache = SubscriptionCache::new(platform.storage.clone());
        Self {
            platform,
            relay,
            cache,
            application_server_key,
            subscription: None,
            status: String::new(),
            is_loading: false,
            is_supported: false,
        }
    }

    pub fn subscription(&self) -> Option<&PushSubscription> {
        self.subscription.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// `false` until [`init`](Self::init) has found both browser APIs.
    pub fn is_supported(&self) -> bool {
        self.is_supported
    }

    /// Registers the service worker and restores the cached subscription.
    /// Does neither when the browser lacks push support.
    pub async fn init(&mut self) {
        self.is_supported = push_supported(self.platform.capabilities.as_ref());
        if !self.is_supported {
            tracing::warn!("Push notifications are not supported");
            self.status = STATUS_UNSUPPORTED.to_string();
            return;
        }

        if let Err(e) = register_service_worker(self.platform.service_worker.as_ref()).await {
            tracing::error!("Failed to register service worker: {}", e);
        }

        match self.cache.load() {
            Ok(Some(subscription)) => {
                tracing::debug!("Loaded cached subscription: {}", subscription.endpoint);
                self.subscription = Some(subscription);
            }
            Ok(None) => {}
            Err(e) => tracing::error!("Failed to load cached subscription: {}", e),
        }
    }

    pub async fn subscribe(&mut self) {
        if self.is_loading || !self.is_supported {
            return;
        }
        self.is_loading = true;
        self.status = STATUS_SUBSCRIBING.to_string();

        match self.try_subscribe().await {
            Ok(subscription) => {
                self.subscription = Some(subscription);
                self.status = STATUS_SUBSCRIBED.to_string();
            }
            Err(e) => self.fail("subscribe", e),
        }

        self.is_loading = false;
    }

    async fn try_subscribe(&self) -> Result<PushSubscription, ClientError> {
        let subscription = register_push(
            self.platform.permissions.as_ref(),
            self.platform.push_manager.as_ref(),
            &self.application_server_key,
        )
        .await?;

        self.relay.subscribe(&subscription).await?.into_result()?;

        if let Err(e) = self.cache.save(&subscription) {
            tracing::error!("Failed to cache subscription: {}", e);
        }
        Ok(subscription)
    }

    pub async fn unsubscribe(&mut self) {
        if self.is_loading || self.subscription.is_none() {
            return;
        }
        self.is_loading = true;
        self.status = STATUS_UNSUBSCRIBING.to_string();

        match self.try_unsubscribe().await {
            Ok(()) => {
                self.subscription = None;
                self.status = STATUS_UNSUBSCRIBED.to_string();
            }
            Err(e) => self.fail("unsubscribe", e),
        }

        self.is_loading = false;
    }

    async fn try_unsubscribe(&self) -> Result<(), ClientError> {
        self.platform.push_manager.unsubscribe().await?;
        self.relay.unsubscribe().await?.into_result()?;

        if let Err(e) = self.cache.remove() {
            tracing::error!("Failed to remove cached subscription: {}", e);
        }
        Ok(())
    }

    /// Returns `true` when the relay accepted the message, so the page can
    /// clear its input.
    pub async fn send_test(&mut self, message: &str) -> bool {
        if self.is_loading || !self.is_supported {
            return false;
        }
        let Some(subscription) = self.subscription.clone() else {
            self.status = STATUS_NO_SUBSCRIPTION.to_string();
            return false;
        };
        if message.trim().is_empty() {
            self.status = STATUS_EMPTY_MESSAGE.to_string();
            return false;
        }

        self.is_loading = true;
        self.status = STATUS_SENDING.to_string();

        let result = match self.relay.send(&subscription, message).await {
            Ok(outcome) => outcome.into_result(),
            Err(e) => Err(e),
        };
        let sent = match result {
            Ok(()) => {
                self.status = STATUS_SENT.to_string();
                true
            }
            Err(e) => {
                if matches!(e, ClientError::SubscriptionExpired(_)) {
                    self.forget_subscription();
                }
                self.fail("send notification", e);
                false
            }
        };

        self.is_loading = false;
        sent
    }

    /// The relay already dropped the channel, so the page must subscribe again.
    fn forget_subscription(&mut self) {
        self.subscription = None;
        if let Err(e) = self.cache.remove() {
            tracing::error!("Failed to remove cached subscription: {}", e);
        }
    }

    fn fail(&mut self, action: &str, err: ClientError) {
        tracing::error!("Failed to {}: {}", action, err);
        self.status = format!("Error: {err}");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        registration::{
            fakes::{
                key, subscription, FakeCapabilities, FakeContainer, FakePermissions,
                FakePushManager,
            },
            Permission,
        },
        relay::ActionOutcome,
        storage::MemoryStorage,
    };

    #[derive(Default)]
    struct RecordingRelay {
        subscribed: Mutex<Vec<PushSubscription>>,
        unsubscribes: Mutex<usize>,
        sent: Mutex<Vec<(PushSubscription, String)>>,
        send_failure: Option<ActionOutcome>,
    }

    impl RecordingRelay {
        fn failing_send(error: &str, code: &str) -> Self {
            Self {
                send_failure: Some(ActionOutcome::failed(error, code)),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl RelayApi for RecordingRelay {
        async fn subscribe(
            &self,
            subscription: &PushSubscription,
        ) -> Result<ActionOutcome, ClientError> {
            self.subscribed.lock().unwrap().push(subscription.clone());
            Ok(ActionOutcome::ok())
        }

        async fn unsubscribe(&self) -> Result<ActionOutcome, ClientError> {
            *self.unsubscribes.lock().unwrap() += 1;
            Ok(ActionOutcome::ok())
        }

        async fn send(
            &self,
            subscription: &PushSubscription,
            message: &str,
        ) -> Result<ActionOutcome, ClientError> {
            self.sent
                .lock()
                .unwrap()
                .push((subscription.clone(), message.to_string()));
            Ok(self.send_failure.clone().unwrap_or_else(ActionOutcome::ok))
        }
    }

    struct Harness {
        storage: Arc<MemoryStorage>,
        container: Arc<FakeContainer>,
        push_manager: Arc<FakePushManager>,
        relay: Arc<RecordingRelay>,
        controller: PushController,
    }

    fn build(
        capabilities: FakeCapabilities,
        permission: Permission,
        relay: RecordingRelay,
    ) -> Harness {
        let storage = Arc::new(MemoryStorage::new());
        let container = Arc::new(FakeContainer::default());
        let push_manager = Arc::new(FakePushManager::new(subscription("a")));
        let relay = Arc::new(relay);
        let platform = Platform {
            capabilities: Arc::new(capabilities),
            service_worker: container.clone(),
            permissions: Arc::new(FakePermissions(permission)),
            push_manager: push_manager.clone(),
            storage: storage.clone(),
        };
        let controller = PushController::new(platform, relay.clone(), key());
        Harness {
            storage,
            container,
            push_manager,
            relay,
            controller,
        }
    }

    /// Controller past `init` in a browser with push support.
    async fn harness(permission: Permission, relay: RecordingRelay) -> Harness {
        let mut h = build(FakeCapabilities::full(), permission, relay);
        h.controller.init().await;
        h
    }

    #[tokio::test]
    async fn subscribe_stores_and_relays() {
        let mut h = harness(Permission::Granted, RecordingRelay::default()).await;

        h.controller.subscribe().await;

        assert_eq!(h.controller.status(), STATUS_SUBSCRIBED);
        assert!(!h.controller.is_loading());
        assert_eq!(h.controller.subscription(), Some(&subscription("a")));
        assert_eq!(h.relay.subscribed.lock().unwrap().len(), 1);
        assert!(h.storage.get_item("pushSubscription").unwrap().is_some());
    }

    #[tokio::test]
    async fn permission_denied_is_reported_not_propagated() {
        let mut h = harness(Permission::Denied, RecordingRelay::default()).await;

        h.controller.subscribe().await;

        assert_eq!(h.controller.status(), "Error: notification permission denied");
        assert!(h.controller.subscription().is_none());
        assert!(h.relay.subscribed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_without_subscription_makes_no_relay_call() {
        let mut h = harness(Permission::Granted, RecordingRelay::default()).await;

        assert!(!h.controller.send_test("hello").await);

        assert_eq!(h.controller.status(), STATUS_NO_SUBSCRIPTION);
        assert!(h.relay.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_message_makes_no_relay_call() {
        let mut h = harness(Permission::Granted, RecordingRelay::default()).await;
        h.controller.subscribe().await;

        assert!(!h.controller.send_test("   ").await);

        assert_eq!(h.controller.status(), STATUS_EMPTY_MESSAGE);
        assert!(h.relay.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_passes_subscription_and_message() {
        let mut h = harness(Permission::Granted, RecordingRelay::default()).await;
        h.controller.subscribe().await;

        assert!(h.controller.send_test("hello").await);

        assert_eq!(h.controller.status(), STATUS_SENT);
        let sent = h.relay.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, subscription("a"));
        assert_eq!(sent[0].1, "hello");
    }

    #[tokio::test]
    async fn relay_error_is_rendered_in_status() {
        let relay =
            RecordingRelay::failing_send("push service rejected the message", "TRANSPORT_FAILURE");
        let mut h = harness(Permission::Granted, relay).await;
        h.controller.subscribe().await;

        assert!(!h.controller.send_test("hello").await);

        assert_eq!(
            h.controller.status(),
            "Error: push service rejected the message"
        );
        assert_eq!(h.controller.subscription(), Some(&subscription("a")));
        assert!(h.storage.get_item("pushSubscription").unwrap().is_some());
    }

    #[tokio::test]
    async fn expired_subscription_is_forgotten() {
        let relay = RecordingRelay::failing_send(
            "subscription expired and was removed",
            "SUBSCRIPTION_EXPIRED",
        );
        let mut h = harness(Permission::Granted, relay).await;
        h.controller.subscribe().await;
        assert!(h.storage.get_item("pushSubscription").unwrap().is_some());

        assert!(!h.controller.send_test("hello").await);

        assert!(h.controller.subscription().is_none());
        assert!(h.storage.get_item("pushSubscription").unwrap().is_none());
        assert_eq!(
            h.controller.status(),
            "Error: subscription expired and was removed"
        );

        assert!(!h.controller.send_test("hello again").await);
        assert_eq!(h.controller.status(), STATUS_NO_SUBSCRIPTION);
        assert_eq!(h.relay.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unsubscribe_clears_everything() {
        let mut h = harness(Permission::Granted, RecordingRelay::default()).await;
        h.controller.subscribe().await;

        h.controller.unsubscribe().await;

        assert_eq!(h.controller.status(), STATUS_UNSUBSCRIBED);
        assert!(h.controller.subscription().is_none());
        assert_eq!(*h.push_manager.unsubscribe_calls.lock().unwrap(), 1);
        assert_eq!(*h.relay.unsubscribes.lock().unwrap(), 1);
        assert!(h.storage.get_item("pushSubscription").unwrap().is_none());
    }

    #[tokio::test]
    async fn unsubscribe_without_subscription_is_noop() {
        let mut h = harness(Permission::Granted, RecordingRelay::default()).await;

        h.controller.unsubscribe().await;

        assert_eq!(h.controller.status(), "");
        assert_eq!(*h.push_manager.unsubscribe_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn init_restores_cached_subscription() {
        let mut h = build(
            FakeCapabilities::full(),
            Permission::Granted,
            RecordingRelay::default(),
        );
        SubscriptionCache::new(h.storage.clone())
            .save(&subscription("a"))
            .unwrap();

        h.controller.init().await;

        assert!(h.controller.is_supported());
        assert_eq!(h.controller.subscription(), Some(&subscription("a")));
        assert_eq!(h.container.registrations.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn init_without_push_manager_does_nothing() {
        let mut h = build(
            FakeCapabilities {
                service_worker: true,
                push_manager: false,
            },
            Permission::Granted,
            RecordingRelay::default(),
        );
        SubscriptionCache::new(h.storage.clone())
            .save(&subscription("a"))
            .unwrap();

        h.controller.init().await;

        assert!(!h.controller.is_supported());
        assert_eq!(h.controller.status(), STATUS_UNSUPPORTED);
        assert!(h.controller.subscription().is_none());
        assert!(h.container.registrations.lock().unwrap().is_empty());

        h.controller.subscribe().await;
        assert!(h.push_manager.subscribe_calls.lock().unwrap().is_empty());
        assert!(h.relay.subscribed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn init_survives_registration_failure_and_corrupt_cache() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item("pushSubscription", "not json").unwrap();
        let platform = Platform {
            capabilities: Arc::new(FakeCapabilities::full()),
            service_worker: Arc::new(FakeContainer {
                fail: true,
                ..Default::default()
            }),
            permissions: Arc::new(FakePermissions(Permission::Granted)),
            push_manager: Arc::new(FakePushManager::new(subscription("a"))),
            storage,
        };
        let mut controller =
            PushController::new(platform, Arc::new(RecordingRelay::default()), key());

        controller.init().await;

        assert!(controller.is_supported());
        assert!(controller.subscription().is_none());
    }
}
