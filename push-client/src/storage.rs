use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use push_contract::PushSubscription;

use crate::ClientError;

pub const SUBSCRIPTION_KEY: &str = "pushSubscription";

/// String key-value storage with `localStorage` semantics.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, ClientError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), ClientError>;
    fn remove_item(&self, key: &str) -> Result<(), ClientError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ClientError> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), ClientError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// The page's copy of its subscription, kept across reloads.
#[derive(Clone)]
pub struct SubscriptionCache {
    storage: Arc<dyn KeyValueStorage>,
}

impl SubscriptionCache {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    pub fn load(&self) -> Result<Option<PushSubscription>, ClientError> {
        match self.storage.get_item(SUBSCRIPTION_KEY)? {
            Some(saved) => Ok(Some(serde_json::from_str(&saved)?)),
            None => Ok(None),
        }
    }

    pub fn save(&self, subscription: &PushSubscription) -> Result<(), ClientError> {
        let json = serde_json::to_string(subscription)?;
        self.storage.set_item(SUBSCRIPTION_KEY, &json)
    }

    pub fn remove(&self) -> Result<(), ClientError> {
        self.storage.remove_item(SUBSCRIPTION_KEY)
    }
}
