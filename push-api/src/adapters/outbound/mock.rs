//! Recording transport and fixtures for tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use push_contract::PushSubscription;

use crate::domain::{ports::outbound::PushTransport, TransportError};

type FailWith = Arc<dyn Fn() -> TransportError + Send + Sync>;

/// Transport that records every call instead of talking to a push service.
#[derive(Clone, Default)]
pub struct MockPushTransport {
    calls: Arc<Mutex<Vec<(PushSubscription, Vec<u8>)>>>,
    fail_with: Option<FailWith>,
}

impl MockPushTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send is recorded and then fails with the produced error.
    pub fn failing_with(error: impl Fn() -> TransportError + Send + Sync + 'static) -> Self {
        Self {
            fail_with: Some(Arc::new(error)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(PushSubscription, Vec<u8>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PushTransport for MockPushTransport {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((subscription.clone(), payload.to_vec()));

        match &self.fail_with {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }
}

/// A valid subscription whose endpoint ends with `id`.
pub fn subscription(id: &str) -> PushSubscription {
    let mut p256dh = vec![0x04];
    p256dh.extend_from_slice(&[id.len() as u8; 64]);
    PushSubscription::new(
        &format!("https://fcm.googleapis.com/fcm/send/{id}"),
        &BASE64_URL_SAFE_NO_PAD.encode(p256dh),
        &BASE64_URL_SAFE_NO_PAD.encode([7u8; 16]),
    )
}
