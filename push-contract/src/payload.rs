use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TITLE: &str = "PWA Test Notification";
pub const DEFAULT_ICON: &str = "/head.png";
pub const DEFAULT_BADGE: &str = "/head.png";
pub const ACTION_ICON: &str = "/icon-192x192.png";
pub const DEFAULT_VIBRATE: [u32; 3] = [100, 50, 100];
pub const DEFAULT_PRIMARY_KEY: i64 = 1;

pub const EXPLORE_ACTION: &str = "explore";
pub const CLOSE_ACTION: &str = "close";

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("failed to serialize notification payload: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to parse notification payload: {0}")]
    Parse(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch.
    pub date_of_arrival: i64,
    pub primary_key: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

impl NotificationAction {
    pub fn new(action: &str, title: &str) -> Self {
        Self {
            action: action.to_string(),
            title: title.to_string(),
            icon: ACTION_ICON.to_string(),
        }
    }

    /// The two buttons every notification carries: open the app, or dismiss.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(EXPLORE_ACTION, "View more"),
            Self::new(CLOSE_ACTION, "Close"),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibrate: Option<Vec<u32>>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

impl NotificationPayload {
    pub fn for_message(message: &str, date_of_arrival: i64) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            body: message.to_string(),
            icon: DEFAULT_ICON.to_string(),
            badge: DEFAULT_BADGE.to_string(),
            vibrate: Some(DEFAULT_VIBRATE.to_vec()),
            data: NotificationData {
                date_of_arrival,
                primary_key: DEFAULT_PRIMARY_KEY,
            },
            actions: NotificationAction::defaults(),
        }
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, PayloadError> {
        serde_json::to_vec(self).map_err(PayloadError::Serialize)
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, PayloadError> {
        serde_json::from_slice(bytes).map_err(PayloadError::Parse)
    }
}
