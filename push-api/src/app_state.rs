use std::sync::Arc;

use push_contract::ApplicationServerKey;

use crate::domain::ports::inbound::PushService;

#[derive(Clone)]
pub struct AppState {
    pub push_service: Arc<dyn PushService>,
    pub application_server_key: ApplicationServerKey,
}

impl AppState {
    pub fn new(
        push_service: Arc<dyn PushService>,
        application_server_key: ApplicationServerKey,
    ) -> Self {
        Self {
            push_service,
            application_server_key,
        }
    }
}
