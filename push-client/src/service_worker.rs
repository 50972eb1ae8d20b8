//! Service worker event handlers: `push`, `notificationclick` and
//! `notificationclose`.
//!
//! Handlers never block. Work that must finish before the worker may be
//! stopped is handed to [`ExtendableEvent::wait_until`].

use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use futures::future::{join_all, BoxFuture, FutureExt};
use push_contract::{
    NotificationAction, NotificationData, CLOSE_ACTION, DEFAULT_BADGE, DEFAULT_ICON,
    DEFAULT_PRIMARY_KEY, DEFAULT_TITLE, DEFAULT_VIBRATE,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

use crate::ClientError;

pub const ROOT_URL: &str = "/";

#[derive(Default)]
pub struct ExtendableEvent {
    pending: Vec<BoxFuture<'static, ()>>,
}

impl ExtendableEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wait_until(&mut self, work: impl Future<Output = ()> + Send + 'static) {
        self.pending.push(work.boxed());
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Resolves once every deferred piece of work has finished.
    pub async fn settle(self) {
        join_all(self.pending).await;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

/// Push message as it arrives; every field may be missing.
#[derive(Debug, Deserialize)]
struct IncomingPush {
    title: Option<String>,
    #[serde(default)]
    body: String,
    icon: Option<String>,
    badge: Option<String>,
    vibrate: Option<Vec<u32>>,
    actions: Option<Vec<NotificationAction>>,
}

impl IncomingPush {
    fn into_notification(self, date_of_arrival: i64) -> (String, NotificationOptions) {
        let title = self.title.unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let options = NotificationOptions {
            body: self.body,
            icon: self.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
            badge: self.badge.unwrap_or_else(|| DEFAULT_BADGE.to_string()),
            vibrate: self.vibrate.unwrap_or_else(|| DEFAULT_VIBRATE.to_vec()),
            data: NotificationData {
                date_of_arrival,
                primary_key: DEFAULT_PRIMARY_KEY,
            },
            actions: self.actions.unwrap_or_else(NotificationAction::defaults),
        };
        (title, options)
    }
}

#[async_trait]
pub trait NotificationSurface: Send + Sync {
    async fn show_notification(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> Result<(), ClientError>;
}

/// A notification the user interacted with.
pub trait DisplayedNotification: Send + Sync {
    fn tag(&self) -> Option<String>;
    fn close(&self);
}

#[async_trait]
pub trait WindowClient: Send + Sync {
    fn url(&self) -> String;
    async fn focus(&self) -> Result<(), ClientError>;
}

#[async_trait]
pub trait WindowClients: Send + Sync {
    async fn match_all(&self) -> Vec<Arc<dyn WindowClient>>;
    async fn open_window(&self, url: &str) -> Result<(), ClientError>;
}

pub struct ServiceWorker {
    surface: Arc<dyn NotificationSurface>,
    clients: Arc<dyn WindowClients>,
}

impl ServiceWorker {
    pub fn new(surface: Arc<dyn NotificationSurface>, clients: Arc<dyn WindowClients>) -> Self {
        Self { surface, clients }
    }

    /// A push without payload is ignored. A payload that is not JSON is
    /// logged and nothing is shown.
    pub fn on_push(
        &self,
        event: &mut ExtendableEvent,
        data: Option<&[u8]>,
    ) -> Result<(), ClientError> {
        let Some(data) = data else {
            tracing::debug!("Push received without payload");
            return Ok(());
        };

        let incoming: IncomingPush = serde_json::from_slice(data).map_err(|e| {
            let err = ClientError::from(e);
            tracing::error!("Failed to parse push payload: {}", err);
            err
        })?;
        let (title, options) = incoming.into_notification(now_millis());
        tracing::debug!("Push received: {}", title);

        let surface = self.surface.clone();
        event.wait_until(async move {
            if let Err(e) = surface.show_notification(&title, &options).await {
                tracing::error!("Failed to show notification: {}", e);
            }
        });
        Ok(())
    }

    pub fn on_notification_click(
        &self,
        event: &mut ExtendableEvent,
        notification: &dyn DisplayedNotification,
        action: Option<&str>,
    ) {
        tracing::debug!("Notification clicked: {:?}", notification.tag());
        notification.close();

        if action == Some(CLOSE_ACTION) {
            return;
        }

        let clients = self.clients.clone();
        event.wait_until(async move {
            if let Err(e) = focus_or_open_root(clients.as_ref()).await {
                tracing::error!("Failed to bring app window forward: {}", e);
            }
        });
    }

    pub fn on_notification_close(&self, notification: &dyn DisplayedNotification) {
        tracing::debug!("Notification closed: {:?}", notification.tag());
    }
}

async fn focus_or_open_root(clients: &dyn WindowClients) -> Result<(), ClientError> {
    for client in clients.match_all().await {
        if is_root(&client.url()) {
            return client.focus().await;
        }
    }
    clients.open_window(ROOT_URL).await
}

/// Client URLs are absolute; only the path is compared.
fn is_root(url: &str) -> bool {
    match Url::parse(url) {
        Ok(url) => url.path() == ROOT_URL && url.query().is_none(),
        Err(_) => url == ROOT_URL,
    }
}

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
